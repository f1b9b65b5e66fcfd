//! Gross-up calculator
//!
//! Scales variable (occupancy-sensitive) expenses up to what they would have
//! cost at a target occupancy. Fixed expenses are never touched. The target is
//! the lowest threshold among tenants whose lease requires gross-up.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::error::{CamError, CamResult};
use crate::models::{ExpenseCategory, ExpenseItem, ExpenseItemId, LeaseTerms, Money};

/// An expense after gross-up
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedExpense {
    pub id: ExpenseItemId,
    pub category: ExpenseCategory,
    pub is_variable: bool,
    pub raw_amount: Money,
    pub amount: Money,
}

/// Outcome of the gross-up step
#[derive(Debug, Clone, PartialEq)]
pub struct GrossUpResult {
    /// Whether any expense was scaled
    pub applied: bool,
    /// Target occupancy as a fraction, when a gross-up tenant exists
    pub target_occupancy: Option<Decimal>,
    /// Occupied SF / building SF
    pub actual_occupancy: Decimal,
    /// Multiplier applied to variable expenses (1 when not applied)
    pub factor: Decimal,
    pub raw_total: Money,
    pub raw_variable_total: Money,
    /// Variable expenses after gross-up
    pub grossed_up_total: Money,
    /// `grossed_up_total - raw_variable_total`
    pub total_gross_up: Money,
    pub expenses: Vec<AdjustedExpense>,
}

impl GrossUpResult {
    /// Adjusted pool: fixed expenses plus grossed-up variable expenses
    pub fn pool_total(&self) -> Money {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// Adjusted pool per category
    pub fn category_totals(&self) -> BTreeMap<ExpenseCategory, Money> {
        let mut totals = BTreeMap::new();
        for expense in &self.expenses {
            *totals.entry(expense.category).or_insert_with(Money::zero) += expense.amount;
        }
        totals
    }
}

/// Apply gross-up to a set of expenses
///
/// `leases` should only contain tenants whose terms validated; a tenant with
/// a broken gross-up provision must not influence everyone else's pool.
pub fn calculate_gross_up<'a, I>(
    expenses: &[ExpenseItem],
    building_total_sf: Decimal,
    occupied_sf: Decimal,
    leases: I,
) -> CamResult<GrossUpResult>
where
    I: IntoIterator<Item = &'a LeaseTerms>,
{
    if building_total_sf <= Decimal::ZERO {
        return Err(CamError::InvalidInput(format!(
            "building_total_sf must be positive, got {}",
            building_total_sf
        )));
    }

    let target_occupancy = leases
        .into_iter()
        .filter(|l| l.has_gross_up)
        .filter_map(|l| l.gross_up_occupancy_threshold)
        .min()
        .map(|threshold| threshold / Decimal::ONE_HUNDRED);

    if target_occupancy.is_some() && occupied_sf <= Decimal::ZERO {
        return Err(CamError::InvalidInput(
            "gross-up is undefined with zero occupied SF".into(),
        ));
    }

    let actual_occupancy = occupied_sf / building_total_sf;
    let factor = match target_occupancy {
        Some(target) if actual_occupancy < target => target / actual_occupancy,
        _ => Decimal::ONE,
    };
    let applied = factor != Decimal::ONE;

    let adjusted: Vec<AdjustedExpense> = expenses
        .iter()
        .map(|e| AdjustedExpense {
            id: e.id,
            category: e.category,
            is_variable: e.is_variable,
            raw_amount: e.amount,
            amount: if e.is_variable && applied {
                e.amount * factor
            } else {
                e.amount
            },
        })
        .collect();

    let raw_total: Money = adjusted.iter().map(|e| e.raw_amount).sum();
    let raw_variable_total: Money = adjusted
        .iter()
        .filter(|e| e.is_variable)
        .map(|e| e.raw_amount)
        .sum();
    let grossed_up_total: Money = adjusted
        .iter()
        .filter(|e| e.is_variable)
        .map(|e| e.amount)
        .sum();

    if applied {
        log::debug!(
            "Gross-up applied: occupancy {} below target {:?}, factor {}",
            actual_occupancy,
            target_occupancy,
            factor
        );
    }

    Ok(GrossUpResult {
        applied,
        target_occupancy,
        actual_occupancy,
        factor,
        raw_total,
        raw_variable_total,
        grossed_up_total,
        total_gross_up: grossed_up_total - raw_variable_total,
        expenses: adjusted,
    })
}
