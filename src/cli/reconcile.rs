//! CLI handlers for the reconciliation lifecycle

use std::path::PathBuf;

use crate::config::Settings;
use crate::display::{
    format_allocation_table, format_category_table, format_reconciliation_list,
    format_reconciliation_summary,
};
use crate::error::CamResult;
use crate::models::{PropertyId, Reconciliation, TenantId};
use crate::reports::{ReconciliationReport, TenantStatement};
use crate::services::ReconciliationService;
use crate::storage::Storage;

use super::request::CalculationRequest;

/// Create or recalculate a draft from a request file
pub fn handle_calculate(
    storage: &Storage,
    settings: &Settings,
    input_path: PathBuf,
    id: Option<String>,
    expected_version: Option<u64>,
) -> CamResult<()> {
    let service = ReconciliationService::new(storage);
    let request = CalculationRequest::from_file(&input_path)?;
    let input = request.to_input(settings);

    let target = match (id, request.reconciliation_id) {
        (Some(identifier), _) => Some(service.find(&identifier)?),
        (None, Some(rec_id)) => Some(service.get(rec_id)?),
        (None, None) => None,
    };

    let draft = match target {
        Some(rec) => {
            request.check_target(&rec)?;
            rec
        }
        None => {
            let rec = service.create_draft(
                request.property_id.unwrap_or_default(),
                request.period,
                request.allocation_method(settings),
                request.building_total_sf,
            )?;
            println!("Created draft reconciliation {}", rec.id);
            rec
        }
    };

    let version = expected_version.unwrap_or(draft.version);
    let (rec, outcome) = service.calculate(draft.id, version, &input)?;

    println!("{}", format_reconciliation_summary(&rec));
    println!("{}", format_allocation_table(&rec));

    if !outcome.errors.is_empty() {
        println!();
        println!("{} tenant(s) skipped:", outcome.errors.len());
        for error in &outcome.errors {
            println!("  {}", error);
        }
    }

    let variance = crate::services::variance(&rec);
    if variance.exceeds(settings.variance_tolerance) {
        println!();
        println!(
            "Note: {} of the pool ({:.2}%) is not allocated to any tenant.",
            variance.variance.round_to_cents(),
            variance.percent
        );
    }

    Ok(())
}

/// Finalize a draft
pub fn handle_finalize(
    storage: &Storage,
    identifier: &str,
    expected_version: Option<u64>,
) -> CamResult<()> {
    let service = ReconciliationService::new(storage);
    let rec = service.find(identifier)?;
    let version = expected_version.unwrap_or(rec.version);

    let finalized = service.finalize(rec.id, version)?;
    println!(
        "Finalized reconciliation {}: {} tenants, {} allocated",
        finalized.id,
        finalized.items.len(),
        finalized.total_allocated()
    );
    Ok(())
}

/// Show one reconciliation
pub fn handle_show(
    storage: &Storage,
    settings: &Settings,
    identifier: &str,
    full_report: bool,
) -> CamResult<()> {
    let service = ReconciliationService::new(storage);
    let rec = service.find(identifier)?;

    if full_report {
        let report = ReconciliationReport::generate(&rec, settings.variance_tolerance);
        print!("{}", report.format_terminal());
        return Ok(());
    }

    println!("{}", format_reconciliation_summary(&rec));
    println!("{}", format_category_table(&rec));
    println!();
    println!("{}", format_allocation_table(&rec));
    for error in &rec.tenant_errors {
        println!("  {}", error);
    }
    Ok(())
}

/// List reconciliations, optionally for one property
pub fn handle_list(storage: &Storage, property: Option<String>) -> CamResult<()> {
    let service = ReconciliationService::new(storage);
    let reconciliations = match property {
        Some(p) => {
            let property_id: PropertyId = p.parse().map_err(|_| {
                crate::error::CamError::InvalidInput(format!("Invalid property ID: {}", p))
            })?;
            service.list_for_property(property_id)?
        }
        None => service.list()?,
    };

    println!("{}", format_reconciliation_list(&reconciliations));
    Ok(())
}

/// Print a tenant statement; the tenant is matched by ID or by name
pub fn handle_statement(storage: &Storage, identifier: &str, tenant: &str) -> CamResult<()> {
    let service = ReconciliationService::new(storage);
    let rec = service.find(identifier)?;

    let statement = statement_for(&rec, tenant)?;
    print!("{}", statement.format_terminal());
    Ok(())
}

fn statement_for(rec: &Reconciliation, tenant: &str) -> CamResult<TenantStatement> {
    if let Ok(tenant_id) = tenant.parse::<TenantId>() {
        if rec.item_for(tenant_id).is_some() {
            return TenantStatement::generate(rec, tenant_id);
        }
    }
    if let Some(item) = rec
        .items
        .iter()
        .find(|i| i.tenant_id.to_string() == tenant)
    {
        return TenantStatement::generate(rec, item.tenant_id);
    }
    TenantStatement::for_tenant_name(rec, tenant)
}

/// Print the audit history of a reconciliation
pub fn handle_history(storage: &Storage, identifier: &str) -> CamResult<()> {
    let service = ReconciliationService::new(storage);
    let rec = service.find(identifier)?;

    let entries = service.history(rec.id)?;
    if entries.is_empty() {
        println!("No audit entries for {}.", rec.id);
    }
    for entry in entries {
        println!("{}", entry.format_human_readable());
    }
    Ok(())
}
