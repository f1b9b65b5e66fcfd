//! Reconciliation records
//!
//! A `Reconciliation` is one calculation run for a property and period. It
//! starts as a draft, may be recalculated any number of times, and becomes
//! immutable once finalized. Its items are always replaced as a whole set.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::ExpenseCategory;
use super::ids::{PropertyId, ReconciliationId, TenantId};
use super::lease::CreditPrecedence;
use super::money::Money;
use super::period::Period;

/// How the expense pool is split between tenants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMethod {
    /// Share = leased SF / building SF
    #[default]
    ProRataSf,
    /// Share = 1 / number of occupying tenants
    EqualShare,
}

impl fmt::Display for AllocationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationMethod::ProRataSf => write!(f, "Pro-rata by SF"),
            AllocationMethod::EqualShare => write!(f, "Equal share"),
        }
    }
}

/// Lifecycle state of a reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconciliationStatus {
    Draft,
    Finalized,
}

impl fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconciliationStatus::Draft => write!(f, "Draft"),
            ReconciliationStatus::Finalized => write!(f, "Finalized"),
        }
    }
}

/// One tenant's allocation result
///
/// Intermediate figures are kept at full precision; only `allocated_amount`
/// and `balance_due` are settled to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationItem {
    pub tenant_id: TenantId,
    pub tenant_name: String,
    pub leased_sf: Decimal,
    pub share_percent: Decimal,
    /// Gross-up-adjusted pool before this tenant's exclusions
    pub pool_amount: Money,
    pub excluded_amount: Money,
    pub pre_cap_amount: Money,
    pub admin_fee: Money,
    pub base_year_credit: Money,
    pub expense_stop_credit: Money,
    pub credit_precedence: CreditPrecedence,
    pub cam_cap_applied: Money,
    pub occupied_days: i64,
    pub period_days: i64,
    pub proration_factor: Decimal,
    pub allocated_amount: Money,
    pub amount_paid: Money,
    pub balance_due: Money,
}

/// A tenant skipped during calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantError {
    pub tenant_id: TenantId,
    pub tenant_name: String,
    pub message: String,
}

impl fmt::Display for TenantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tenant {} skipped: {}", self.tenant_name, self.message)
    }
}

/// Per-category total of the adjusted expense pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: Money,
    pub percent_of_total: Decimal,
}

/// One reconciliation run for a property and period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub id: ReconciliationId,
    pub property_id: PropertyId,
    pub period: Period,
    pub allocation_method: AllocationMethod,
    pub building_total_sf: Decimal,

    /// Unadjusted sum of in-scope expenses
    pub raw_expense_total: Money,
    /// Gross-up-adjusted pool that allocations are drawn from
    pub total_cam_expenses: Money,
    /// Variable expenses after gross-up
    pub grossed_up_total: Money,
    pub total_gross_up: Money,

    pub category_breakdown: Vec<CategoryTotal>,
    pub items: Vec<ReconciliationItem>,
    pub tenant_errors: Vec<TenantError>,

    pub is_finalized: bool,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub calculated_at: Option<DateTime<Utc>>,
    pub finalized_at: Option<DateTime<Utc>>,
}

impl Reconciliation {
    /// Create a new draft reconciliation
    pub fn new_draft(
        property_id: PropertyId,
        period: Period,
        allocation_method: AllocationMethod,
        building_total_sf: Decimal,
    ) -> Self {
        Self {
            id: ReconciliationId::new(),
            property_id,
            period,
            allocation_method,
            building_total_sf,
            raw_expense_total: Money::zero(),
            total_cam_expenses: Money::zero(),
            grossed_up_total: Money::zero(),
            total_gross_up: Money::zero(),
            category_breakdown: Vec::new(),
            items: Vec::new(),
            tenant_errors: Vec::new(),
            is_finalized: false,
            version: 0,
            created_at: Utc::now(),
            calculated_at: None,
            finalized_at: None,
        }
    }

    /// Current lifecycle state
    pub fn status(&self) -> ReconciliationStatus {
        if self.is_finalized {
            ReconciliationStatus::Finalized
        } else {
            ReconciliationStatus::Draft
        }
    }

    /// Whether calculate may still run
    pub fn is_draft(&self) -> bool {
        !self.is_finalized
    }

    /// Sum of allocated amounts across items
    pub fn total_allocated(&self) -> Money {
        self.items.iter().map(|i| i.allocated_amount).sum()
    }

    /// Sum of estimated payments across items
    pub fn total_paid(&self) -> Money {
        self.items.iter().map(|i| i.amount_paid).sum()
    }

    /// Sum of balances due across items
    pub fn total_balance_due(&self) -> Money {
        self.items.iter().map(|i| i.balance_due).sum()
    }

    /// Pool minus what was allocated; reported, never corrected
    pub fn variance(&self) -> Money {
        self.total_cam_expenses - self.total_allocated()
    }

    /// Find a tenant's item
    pub fn item_for(&self, tenant_id: TenantId) -> Option<&ReconciliationItem> {
        self.items.iter().find(|i| i.tenant_id == tenant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_draft() {
        let rec = Reconciliation::new_draft(
            PropertyId::new(),
            Period::annual(2025).unwrap(),
            AllocationMethod::ProRataSf,
            dec!(100000),
        );
        assert!(rec.is_draft());
        assert_eq!(rec.status(), ReconciliationStatus::Draft);
        assert_eq!(rec.version, 0);
        assert!(rec.items.is_empty());
        assert!(rec.variance().is_zero());
    }

    #[test]
    fn test_allocation_method_serde() {
        assert_eq!(
            serde_json::to_string(&AllocationMethod::ProRataSf).unwrap(),
            "\"pro_rata_sf\""
        );
        let parsed: AllocationMethod = serde_json::from_str("\"equal_share\"").unwrap();
        assert_eq!(parsed, AllocationMethod::EqualShare);
    }

    #[test]
    fn test_tenant_error_display() {
        let err = TenantError {
            tenant_id: TenantId::new(),
            tenant_name: "Acme Dental".into(),
            message: "invalid CAM cap configuration".into(),
        };
        assert_eq!(
            err.to_string(),
            "Tenant Acme Dental skipped: invalid CAM cap configuration"
        );
    }
}
