//! Reconciliation display formatting
//!
//! Tables for terminal output, rendered with `tabled`.

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::models::Reconciliation;

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Property")]
    property: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Ver")]
    version: u64,
    #[tabled(rename = "Tenants")]
    tenants: usize,
    #[tabled(rename = "CAM Pool")]
    pool: String,
    #[tabled(rename = "Allocated")]
    allocated: String,
}

#[derive(Tabled)]
struct AllocationRow {
    #[tabled(rename = "Tenant")]
    tenant: String,
    #[tabled(rename = "SF")]
    leased_sf: String,
    #[tabled(rename = "Share %")]
    share: String,
    #[tabled(rename = "Pre-Cap")]
    pre_cap: String,
    #[tabled(rename = "Admin")]
    admin_fee: String,
    #[tabled(rename = "Credits")]
    credits: String,
    #[tabled(rename = "Cap")]
    cap: String,
    #[tabled(rename = "Prorate")]
    proration: String,
    #[tabled(rename = "Allocated")]
    allocated: String,
    #[tabled(rename = "Balance")]
    balance: String,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "%")]
    percent: String,
}

/// Format a list of reconciliations as a table
pub fn format_reconciliation_list(reconciliations: &[Reconciliation]) -> String {
    if reconciliations.is_empty() {
        return "No reconciliations found.".to_string();
    }

    let rows = reconciliations.iter().map(|rec| ListRow {
        id: rec.id.to_string(),
        property: rec.property_id.to_string(),
        period: format!("{} - {}", rec.period.start, rec.period.end),
        status: rec.status().to_string(),
        version: rec.version,
        tenants: rec.items.len(),
        pool: rec.total_cam_expenses.round_to_cents().to_string(),
        allocated: rec.total_allocated().to_string(),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .modify(Columns::new(4..), Alignment::right());
    table.to_string()
}

/// Format every tenant's allocation as a table
pub fn format_allocation_table(rec: &Reconciliation) -> String {
    if rec.items.is_empty() {
        return "No allocations calculated.".to_string();
    }

    let rows = rec.items.iter().map(|item| AllocationRow {
        tenant: item.tenant_name.clone(),
        leased_sf: item.leased_sf.to_string(),
        share: format!("{:.4}", item.share_percent * rust_decimal::Decimal::ONE_HUNDRED),
        pre_cap: item.pre_cap_amount.round_to_cents().to_string(),
        admin_fee: item.admin_fee.round_to_cents().to_string(),
        credits: (item.base_year_credit + item.expense_stop_credit)
            .round_to_cents()
            .to_string(),
        cap: item.cam_cap_applied.round_to_cents().to_string(),
        proration: format!("{:.4}", item.proration_factor),
        allocated: item.allocated_amount.to_string(),
        balance: item.balance_due.to_string(),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

/// Format the expense pool by category as a table
pub fn format_category_table(rec: &Reconciliation) -> String {
    if rec.category_breakdown.is_empty() {
        return "No expenses recorded.".to_string();
    }

    let rows = rec.category_breakdown.iter().map(|row| CategoryRow {
        category: row.category.label().to_string(),
        total: row.total.round_to_cents().to_string(),
        percent: format!("{:.2}", row.percent_of_total),
    });

    let mut table = Table::new(rows);
    table
        .with(Style::psql())
        .modify(Columns::new(1..), Alignment::right());
    table.to_string()
}

/// Header block for a single reconciliation
pub fn format_reconciliation_summary(rec: &Reconciliation) -> String {
    let mut output = String::new();
    output.push_str(&format!("Reconciliation: {} ({})\n", rec.id, rec.status()));
    output.push_str(&format!("Property:       {}\n", rec.property_id));
    output.push_str(&format!("Period:         {}\n", rec.period));
    output.push_str(&format!("Method:         {}\n", rec.allocation_method));
    output.push_str(&format!("Version:        {}\n", rec.version));
    match rec.calculated_at {
        Some(at) => output.push_str(&format!("Calculated:     {}\n", at.format("%Y-%m-%d %H:%M"))),
        None => output.push_str("Calculated:     never\n"),
    }
    if let Some(at) = rec.finalized_at {
        output.push_str(&format!("Finalized:      {}\n", at.format("%Y-%m-%d %H:%M")));
    }
    output.push_str(&format!(
        "CAM pool:       {} (raw {}, gross-up {})\n",
        rec.total_cam_expenses.round_to_cents(),
        rec.raw_expense_total,
        rec.total_gross_up.round_to_cents()
    ));
    output.push_str(&format!("Allocated:      {}\n", rec.total_allocated()));
    output.push_str(&format!("Variance:       {}\n", rec.variance().round_to_cents()));
    output
}
