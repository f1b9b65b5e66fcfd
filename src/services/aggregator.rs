//! Reconciliation aggregator
//!
//! Applies a calculation to a draft reconciliation and drives its lifecycle.
//! These functions work on a record in memory; persistence and concurrency
//! control live in `ReconciliationService`.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::allocation::{self, CalculationInput, CalculationOutcome};
use crate::error::{CamError, CamResult};
use crate::models::{CategoryTotal, Money, Reconciliation};

/// Recalculate a draft, replacing its items and totals as one set
///
/// On error the reconciliation is left untouched.
pub fn calculate(
    reconciliation: &mut Reconciliation,
    input: &CalculationInput,
) -> CamResult<CalculationOutcome> {
    let outcome = allocation::calculate(reconciliation, input)?;
    let pool = outcome.gross_up.pool_total();

    let mut breakdown: Vec<CategoryTotal> = outcome
        .gross_up
        .category_totals()
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category,
            total,
            percent_of_total: total.percent_of(pool),
        })
        .collect();
    // Largest first; ties keep category order
    breakdown.sort_by(|a, b| b.total.cmp(&a.total));

    reconciliation.building_total_sf = outcome.building_total_sf;
    reconciliation.raw_expense_total = outcome.gross_up.raw_total;
    reconciliation.total_cam_expenses = pool;
    reconciliation.grossed_up_total = outcome.gross_up.grossed_up_total;
    reconciliation.total_gross_up = outcome.gross_up.total_gross_up;
    reconciliation.category_breakdown = breakdown;
    reconciliation.items = outcome.items.clone();
    reconciliation.tenant_errors = outcome.errors.clone();
    reconciliation.calculated_at = Some(Utc::now());
    reconciliation.version += 1;

    Ok(outcome)
}

/// Finalize a draft; afterwards it can never be recalculated
pub fn finalize(reconciliation: &mut Reconciliation) -> CamResult<()> {
    if reconciliation.is_finalized {
        return Err(CamError::NotDraft(reconciliation.id));
    }
    if reconciliation.items.is_empty() {
        return Err(CamError::EmptyAllocation(reconciliation.id));
    }

    reconciliation.is_finalized = true;
    reconciliation.finalized_at = Some(Utc::now());
    reconciliation.version += 1;
    Ok(())
}

/// Difference between the pool and the sum of allocations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Variance {
    pub total_cam_expenses: Money,
    pub total_allocated: Money,
    pub variance: Money,
    /// Variance as a percentage of the pool
    pub percent: Decimal,
}

impl Variance {
    /// Whether the variance is larger than `tolerance` in either direction
    pub fn exceeds(&self, tolerance: Money) -> bool {
        self.variance.abs() > tolerance.abs()
    }
}

/// Report the allocation variance; it is never corrected
pub fn variance(reconciliation: &Reconciliation) -> Variance {
    let variance = reconciliation.variance();
    Variance {
        total_cam_expenses: reconciliation.total_cam_expenses,
        total_allocated: reconciliation.total_allocated(),
        variance,
        percent: variance.percent_of(reconciliation.total_cam_expenses),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AllocationMethod, ExpenseCategory, ExpenseItem, LeaseTerms, Period, PropertyId, TenantId,
    };
    use rust_decimal_macros::dec;

    fn period() -> Period {
        Period::annual(2025).unwrap()
    }

    fn draft() -> Reconciliation {
        Reconciliation::new_draft(
            PropertyId::new(),
            period(),
            AllocationMethod::ProRataSf,
            dec!(100000),
        )
    }

    fn input() -> CalculationInput {
        let expenses = vec![
            ExpenseItem::new(ExpenseCategory::PropertyTax, Money::from_dollars(30000), period()),
            ExpenseItem::new(ExpenseCategory::Insurance, Money::from_dollars(10000), period()),
            ExpenseItem::new(ExpenseCategory::PropertyTax, Money::from_dollars(20000), period()),
        ];
        let leases = vec![
            LeaseTerms::new(TenantId::new(), dec!(40000)),
            LeaseTerms::new(TenantId::new(), dec!(50000)),
        ];
        CalculationInput::new(expenses, leases, dec!(100000))
    }

    #[test]
    fn test_calculate_populates_totals() {
        let mut rec = draft();
        calculate(&mut rec, &input()).unwrap();

        assert_eq!(rec.version, 1);
        assert!(rec.calculated_at.is_some());
        assert_eq!(rec.items.len(), 2);
        assert_eq!(rec.raw_expense_total, Money::from_dollars(60000));
        assert_eq!(rec.total_cam_expenses, Money::from_dollars(60000));
        assert!(rec.total_gross_up.is_zero());

        assert_eq!(rec.category_breakdown.len(), 2);
        assert_eq!(rec.category_breakdown[0].category, ExpenseCategory::PropertyTax);
        assert_eq!(rec.category_breakdown[0].total, Money::from_dollars(50000));
    }

    #[test]
    fn test_recalculate_replaces_items() {
        let mut rec = draft();
        let input = input();
        calculate(&mut rec, &input).unwrap();
        let first = rec.items.clone();
        calculate(&mut rec, &input).unwrap();

        assert_eq!(rec.version, 2);
        assert_eq!(rec.items, first);
    }

    #[test]
    fn test_failed_calculate_leaves_record_untouched() {
        let mut rec = draft();
        calculate(&mut rec, &input()).unwrap();
        let before = rec.clone();

        let mut broken = input();
        broken.building_total_sf = Decimal::ZERO;
        assert!(calculate(&mut rec, &broken).is_err());
        assert_eq!(rec, before);
    }

    #[test]
    fn test_finalize_is_terminal() {
        let mut rec = draft();
        calculate(&mut rec, &input()).unwrap();
        finalize(&mut rec).unwrap();

        assert!(rec.is_finalized);
        assert!(rec.finalized_at.is_some());
        assert!(matches!(finalize(&mut rec), Err(CamError::NotDraft(_))));
        assert!(matches!(
            calculate(&mut rec, &input()),
            Err(CamError::NotDraft(_))
        ));
    }

    #[test]
    fn test_finalize_requires_items() {
        let mut rec = draft();
        assert!(matches!(
            finalize(&mut rec),
            Err(CamError::EmptyAllocation(_))
        ));
        assert!(!rec.is_finalized);
    }

    #[test]
    fn test_variance_reports_unallocated_space() {
        let mut rec = draft();
        calculate(&mut rec, &input()).unwrap();
        let v = variance(&rec);

        // 90% of the building is leased
        assert_eq!(v.total_allocated, Money::from_dollars(54000));
        assert_eq!(v.variance, Money::from_dollars(6000));
        assert_eq!(v.percent, dec!(10));
        assert!(v.exceeds(Money::from_cents(1)));
    }
}
