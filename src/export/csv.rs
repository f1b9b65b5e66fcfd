//! CSV export
//!
//! Tenant allocations and the category breakdown, one row per record, for
//! spreadsheets and accounting imports.

use std::io::Write;

use crate::error::{CamError, CamResult};
use crate::models::Reconciliation;

fn export_err(e: csv::Error) -> CamError {
    CamError::Export(e.to_string())
}

/// Export every tenant's allocation breakdown
pub fn export_allocations_csv<W: Write>(rec: &Reconciliation, writer: W) -> CamResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record([
        "Reconciliation",
        "Period Start",
        "Period End",
        "Tenant ID",
        "Tenant",
        "Leased SF",
        "Share",
        "Pool",
        "Excluded",
        "Pre-Cap Amount",
        "Admin Fee",
        "Base-Year Credit",
        "Expense-Stop Credit",
        "CAM Cap Applied",
        "Occupied Days",
        "Period Days",
        "Proration Factor",
        "Allocated",
        "Paid",
        "Balance Due",
    ])
    .map_err(export_err)?;

    let reconciliation_id = rec.id.as_uuid().to_string();
    let start = rec.period.start.to_string();
    let end = rec.period.end.to_string();

    for item in &rec.items {
        csv.write_record([
            reconciliation_id.clone(),
            start.clone(),
            end.clone(),
            item.tenant_id.as_uuid().to_string(),
            item.tenant_name.clone(),
            item.leased_sf.to_string(),
            item.share_percent.round_dp(8).to_string(),
            item.pool_amount.round_to_cents().amount().to_string(),
            item.excluded_amount.round_to_cents().amount().to_string(),
            item.pre_cap_amount.round_to_cents().amount().to_string(),
            item.admin_fee.round_to_cents().amount().to_string(),
            item.base_year_credit.round_to_cents().amount().to_string(),
            item.expense_stop_credit.round_to_cents().amount().to_string(),
            item.cam_cap_applied.round_to_cents().amount().to_string(),
            item.occupied_days.to_string(),
            item.period_days.to_string(),
            item.proration_factor.round_dp(8).to_string(),
            item.allocated_amount.amount().to_string(),
            item.amount_paid.amount().to_string(),
            item.balance_due.amount().to_string(),
        ])
        .map_err(export_err)?;
    }

    csv.flush().map_err(|e| CamError::Export(e.to_string()))?;
    Ok(())
}

/// Export the expense pool by category
pub fn export_categories_csv<W: Write>(rec: &Reconciliation, writer: W) -> CamResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(["Category", "Label", "Total", "Percent Of Total"])
        .map_err(export_err)?;

    for row in &rec.category_breakdown {
        csv.write_record([
            row.category.key().to_string(),
            row.category.label().to_string(),
            row.total.round_to_cents().amount().to_string(),
            row.percent_of_total.round_dp(4).to_string(),
        ])
        .map_err(export_err)?;
    }

    csv.flush().map_err(|e| CamError::Export(e.to_string()))?;
    Ok(())
}
