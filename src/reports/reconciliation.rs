//! Reconciliation report
//!
//! Summarizes a calculated reconciliation: the expense pool by category, each
//! tenant's allocation and the totals, with the allocation variance flagged
//! when it exceeds the configured tolerance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{
    AllocationMethod, CategoryTotal, Money, Period, PropertyId, Reconciliation, ReconciliationId,
    ReconciliationStatus, TenantError, TenantId,
};
use crate::services::aggregator::{self, Variance};

/// One tenant's line in the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantAllocationRow {
    pub tenant_id: TenantId,
    pub tenant_name: String,
    pub leased_sf: Decimal,
    /// Share of the pool as a percentage (0-100)
    pub share_percent: Decimal,
    pub pre_cap_amount: Money,
    pub admin_fee: Money,
    pub credits: Money,
    pub cam_cap_applied: Money,
    pub proration_factor: Decimal,
    pub allocated_amount: Money,
    pub amount_paid: Money,
    pub balance_due: Money,
}

/// Totals across the whole reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub raw_expense_total: Money,
    pub total_gross_up: Money,
    pub total_cam_expenses: Money,
    pub total_allocated: Money,
    pub total_paid: Money,
    pub total_balance_due: Money,
    pub tenant_count: usize,
}

/// Report for one reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub reconciliation_id: ReconciliationId,
    pub property_id: PropertyId,
    pub period: Period,
    pub status: ReconciliationStatus,
    pub allocation_method: AllocationMethod,
    pub building_total_sf: Decimal,
    pub calculated_at: Option<DateTime<Utc>>,
    pub category_breakdown: Vec<CategoryTotal>,
    pub tenant_allocations: Vec<TenantAllocationRow>,
    pub tenant_errors: Vec<TenantError>,
    pub totals: ReportTotals,
    pub variance: Variance,
    pub variance_flagged: bool,
}

impl ReconciliationReport {
    /// Build the report; variance above `tolerance` is flagged
    pub fn generate(rec: &Reconciliation, tolerance: Money) -> Self {
        let tenant_allocations = rec
            .items
            .iter()
            .map(|item| TenantAllocationRow {
                tenant_id: item.tenant_id,
                tenant_name: item.tenant_name.clone(),
                leased_sf: item.leased_sf,
                share_percent: (item.share_percent * Decimal::ONE_HUNDRED).round_dp(4),
                pre_cap_amount: item.pre_cap_amount.round_to_cents(),
                admin_fee: item.admin_fee.round_to_cents(),
                credits: (item.base_year_credit + item.expense_stop_credit).round_to_cents(),
                cam_cap_applied: item.cam_cap_applied.round_to_cents(),
                proration_factor: item.proration_factor.round_dp(6),
                allocated_amount: item.allocated_amount,
                amount_paid: item.amount_paid,
                balance_due: item.balance_due,
            })
            .collect();

        let variance = aggregator::variance(rec);

        Self {
            reconciliation_id: rec.id,
            property_id: rec.property_id,
            period: rec.period,
            status: rec.status(),
            allocation_method: rec.allocation_method,
            building_total_sf: rec.building_total_sf,
            calculated_at: rec.calculated_at,
            category_breakdown: rec.category_breakdown.clone(),
            tenant_allocations,
            tenant_errors: rec.tenant_errors.clone(),
            totals: ReportTotals {
                raw_expense_total: rec.raw_expense_total,
                total_gross_up: rec.total_gross_up,
                total_cam_expenses: rec.total_cam_expenses,
                total_allocated: rec.total_allocated(),
                total_paid: rec.total_paid(),
                total_balance_due: rec.total_balance_due(),
                tenant_count: rec.items.len(),
            },
            variance,
            variance_flagged: variance.exceeds(tolerance),
        }
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "CAM Reconciliation {} ({})\n",
            self.reconciliation_id, self.status
        ));
        output.push_str(&"=".repeat(100));
        output.push('\n');
        output.push_str(&format!("Property:        {}\n", self.property_id));
        output.push_str(&format!("Period:          {}\n", self.period));
        output.push_str(&format!("Method:          {}\n", self.allocation_method));
        output.push_str(&format!("Building SF:     {}\n", self.building_total_sf));
        output.push_str(&format!("Raw expenses:    {}\n", self.totals.raw_expense_total));
        if !self.totals.total_gross_up.is_zero() {
            output.push_str(&format!("Gross-up:        {}\n", self.totals.total_gross_up));
        }
        output.push_str(&format!("CAM pool:        {}\n\n", self.totals.total_cam_expenses));

        output.push_str("EXPENSES BY CATEGORY\n");
        output.push_str(&format!("{:<30} {:>16} {:>8}\n", "Category", "Amount", "%"));
        output.push_str(&"-".repeat(56));
        output.push('\n');
        for row in &self.category_breakdown {
            output.push_str(&format!(
                "{:<30} {:>16} {:>7.2}%\n",
                row.category.label(),
                row.total.round_to_cents(),
                row.percent_of_total
            ));
        }

        output.push_str("\nTENANT ALLOCATIONS\n");
        output.push_str(&format!(
            "{:<24} {:>10} {:>9} {:>14} {:>14} {:>14} {:>14}\n",
            "Tenant", "SF", "Share %", "Allocated", "Paid", "Balance", "Cap"
        ));
        output.push_str(&"-".repeat(100));
        output.push('\n');
        for row in &self.tenant_allocations {
            output.push_str(&format!(
                "{:<24} {:>10} {:>8.4}% {:>14} {:>14} {:>14} {:>14}\n",
                truncate(&row.tenant_name, 24),
                row.leased_sf,
                row.share_percent,
                row.allocated_amount,
                row.amount_paid,
                row.balance_due,
                row.cam_cap_applied
            ));
        }
        output.push_str(&"-".repeat(100));
        output.push('\n');
        output.push_str(&format!(
            "{:<45} {:>14} {:>14} {:>14}\n",
            format!("TOTAL ({} tenants)", self.totals.tenant_count),
            self.totals.total_allocated,
            self.totals.total_paid,
            self.totals.total_balance_due
        ));

        output.push_str(&format!(
            "\nVariance: {} ({:.4}% of pool){}\n",
            self.variance.variance,
            self.variance.percent,
            if self.variance_flagged {
                "  [exceeds tolerance]"
            } else {
                ""
            }
        ));

        if !self.tenant_errors.is_empty() {
            output.push_str("\nSKIPPED TENANTS\n");
            for error in &self.tenant_errors {
                output.push_str(&format!("  {}\n", error));
            }
        }

        output
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
