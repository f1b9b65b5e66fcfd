//! Diff summaries for audit entries
//!
//! Describes what a calculate or finalize changed in terms a property
//! manager reads: tenant allocations, pool totals and status.

use std::collections::BTreeMap;

use crate::models::{Reconciliation, TenantId};

/// Summarize the changes between two states of a reconciliation
///
/// Returns `None` when nothing reportable changed.
pub fn reconciliation_diff(before: &Reconciliation, after: &Reconciliation) -> Option<String> {
    let mut changes = Vec::new();

    if before.status() != after.status() {
        changes.push(format!("status: {} -> {}", before.status(), after.status()));
    }
    if before.total_cam_expenses != after.total_cam_expenses {
        changes.push(format!(
            "pool: {} -> {}",
            before.total_cam_expenses, after.total_cam_expenses
        ));
    }

    changes.extend(allocation_changes(before, after));

    if before.tenant_errors.len() != after.tenant_errors.len() {
        changes.push(format!(
            "skipped tenants: {} -> {}",
            before.tenant_errors.len(),
            after.tenant_errors.len()
        ));
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn allocation_changes(before: &Reconciliation, after: &Reconciliation) -> Vec<String> {
    let old: BTreeMap<TenantId, _> = before.items.iter().map(|i| (i.tenant_id, i)).collect();
    let new: BTreeMap<TenantId, _> = after.items.iter().map(|i| (i.tenant_id, i)).collect();
    let mut changes = Vec::new();

    for (id, item) in &old {
        match new.get(id) {
            Some(current) if current.allocated_amount != item.allocated_amount => {
                changes.push(format!(
                    "{}: {} -> {}",
                    item.tenant_name, item.allocated_amount, current.allocated_amount
                ));
            }
            Some(_) => {}
            None => changes.push(format!("{}: {} -> (removed)", item.tenant_name, item.allocated_amount)),
        }
    }
    for (id, item) in &new {
        if !old.contains_key(id) {
            changes.push(format!("{}: (added) -> {}", item.tenant_name, item.allocated_amount));
        }
    }

    changes
}
