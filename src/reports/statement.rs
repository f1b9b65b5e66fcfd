//! Tenant statement
//!
//! Step-by-step disclosure of how one tenant's allocation was reached, in the
//! order the engine applies the adjustments. Intended for the tenant's
//! reconciliation package and for resolving disputes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CamError, CamResult};
use crate::models::{
    AllocationMethod, CreditPrecedence, Money, Period, Reconciliation, ReconciliationId,
    ReconciliationItem, TenantId,
};

/// One line of the statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub step: u8,
    pub label: String,
    /// Signed effect of this step on the running amount (the first line is
    /// the starting pool)
    pub amount: Money,
    pub detail: String,
}

/// Allocation statement for one tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantStatement {
    pub reconciliation_id: ReconciliationId,
    pub tenant_id: TenantId,
    pub tenant_name: String,
    pub period: Period,
    pub is_final: bool,
    pub lines: Vec<StatementLine>,
    pub allocated_amount: Money,
    pub amount_paid: Money,
    pub balance_due: Money,
}

impl TenantStatement {
    /// Build the statement for a tenant of a calculated reconciliation
    pub fn generate(rec: &Reconciliation, tenant_id: TenantId) -> CamResult<Self> {
        let item = rec
            .item_for(tenant_id)
            .ok_or_else(|| CamError::tenant_not_found(tenant_id.to_string()))?;

        Ok(Self {
            reconciliation_id: rec.id,
            tenant_id,
            tenant_name: item.tenant_name.clone(),
            period: rec.period,
            is_final: rec.is_finalized,
            lines: lines(rec.allocation_method, item),
            allocated_amount: item.allocated_amount,
            amount_paid: item.amount_paid,
            balance_due: item.balance_due,
        })
    }

    /// Find a tenant by name (case-insensitive) and build their statement
    pub fn for_tenant_name(rec: &Reconciliation, name: &str) -> CamResult<Self> {
        let wanted = name.trim().to_lowercase();
        let item = rec
            .items
            .iter()
            .find(|i| i.tenant_name.to_lowercase() == wanted)
            .ok_or_else(|| CamError::tenant_not_found(name))?;
        Self::generate(rec, item.tenant_id)
    }

    /// Format the statement for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("CAM Statement: {}\n", self.tenant_name));
        output.push_str(&format!(
            "Reconciliation {} / {}{}\n",
            self.reconciliation_id,
            self.period,
            if self.is_final { "" } else { " (DRAFT)" }
        ));
        output.push_str(&"=".repeat(90));
        output.push('\n');

        for line in &self.lines {
            output.push_str(&format!(
                "{}. {:<28} {:>16}   {}\n",
                line.step, line.label, line.amount, line.detail
            ));
        }

        output.push_str(&"-".repeat(90));
        output.push('\n');
        output.push_str(&format!("   {:<28} {:>16}\n", "Allocated", self.allocated_amount));
        output.push_str(&format!("   {:<28} {:>16}\n", "Estimated payments", self.amount_paid));
        let label = if self.balance_due.is_negative() {
            "Credit due to tenant"
        } else {
            "Balance due"
        };
        output.push_str(&format!("   {:<28} {:>16}\n", label, self.balance_due));

        output
    }
}

fn lines(method: AllocationMethod, item: &ReconciliationItem) -> Vec<StatementLine> {
    let line = |step: u8, label: &str, amount: Money, detail: String| StatementLine {
        step,
        label: label.to_string(),
        amount: amount.round_to_cents(),
        detail,
    };

    let share = (item.share_percent * Decimal::ONE_HUNDRED).round_dp(4);
    let share_detail = match method {
        AllocationMethod::ProRataSf => format!("{} SF, {}% of building", item.leased_sf, share),
        AllocationMethod::EqualShare => format!("equal share, {}%", share),
    };

    let credit_detail = match item.credit_precedence {
        CreditPrecedence::BaseYear => "base year takes precedence",
        CreditPrecedence::ExpenseStop => "expense stop takes precedence",
        CreditPrecedence::GreaterCredit => "greater credit applies",
    };

    vec![
        line(1, "CAM pool", item.pool_amount, String::new()),
        line(
            1,
            "Excluded categories",
            -item.excluded_amount,
            String::new(),
        ),
        line(2, "Tenant share", item.pre_cap_amount, share_detail),
        line(3, "Admin fee", item.admin_fee, String::new()),
        line(
            4,
            "Base-year credit",
            -item.base_year_credit,
            credit_detail.to_string(),
        ),
        line(5, "Expense-stop credit", -item.expense_stop_credit, String::new()),
        line(6, "CAM cap", -item.cam_cap_applied, String::new()),
        line(
            7,
            "Proration",
            Money::zero(),
            format!(
                "{} of {} days (factor {})",
                item.occupied_days,
                item.period_days,
                item.proration_factor.round_dp(6)
            ),
        ),
        line(8, "Allocated (rounded)", item.allocated_amount, String::new()),
    ]
}
