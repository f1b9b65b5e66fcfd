//! Allocation engine
//!
//! Apportions the (grossed-up) expense pool of one reconciliation across its
//! tenants. For every tenant the adjustments run in a fixed order, each one
//! building on the output of the previous:
//!
//! 1. expense pool minus the tenant's excluded categories
//! 2. share of the remaining pool (`pre_cap_amount`)
//! 3. admin fee on the pre-cap amount
//! 4. base-year credit
//! 5. expense-stop credit
//! 6. CAM cap
//! 7. occupancy proration
//! 8. rounding to cents and balance against estimated payments
//!
//! The engine is a pure function of its inputs. It reads no clock and no
//! shared state, and iterates tenants in ID order, so the same inputs always
//! produce the same items. Nothing is rounded before step 8.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::gross_up::{calculate_gross_up, GrossUpResult};
use crate::error::{CamError, CamResult};
use crate::models::occupancy::occupied_area;
use crate::models::{
    AllocationMethod, CapType, CreditPrecedence, ExpenseCategory, ExpenseItem, LeaseTerms, Money,
    OccupancyEntry, OccupancySnapshot, OccupancyWindow, Period, Reconciliation,
    ReconciliationItem, TenantError, TenantId,
};

/// Everything a calculation reads, as an immutable snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculationInput {
    pub expenses: Vec<ExpenseItem>,
    pub leases: BTreeMap<TenantId, LeaseTerms>,
    pub building_total_sf: Decimal,
    #[serde(default)]
    pub occupancy: OccupancySnapshot,
    /// Estimated payments already collected, per tenant
    #[serde(default)]
    pub payments: BTreeMap<TenantId, Money>,
}

impl CalculationInput {
    /// Build an input from a list of lease terms
    pub fn new(
        expenses: Vec<ExpenseItem>,
        leases: impl IntoIterator<Item = LeaseTerms>,
        building_total_sf: Decimal,
    ) -> Self {
        Self {
            expenses,
            leases: leases.into_iter().map(|l| (l.tenant_id, l)).collect(),
            building_total_sf,
            occupancy: OccupancySnapshot::new(),
            payments: BTreeMap::new(),
        }
    }

    /// Attach an occupancy snapshot
    pub fn with_occupancy(mut self, occupancy: OccupancySnapshot) -> Self {
        self.occupancy = occupancy;
        self
    }

    /// Record an estimated payment for a tenant
    pub fn with_payment(mut self, tenant_id: TenantId, amount: Money) -> Self {
        self.payments.insert(tenant_id, amount);
        self
    }
}

/// Result of one calculation pass
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationOutcome {
    pub items: Vec<ReconciliationItem>,
    pub errors: Vec<TenantError>,
    pub gross_up: GrossUpResult,
    pub occupied_sf: Decimal,
    pub occupied_tenant_count: usize,
    pub building_total_sf: Decimal,
}

/// Shared, tenant-independent figures for one calculation
struct PoolContext<'a> {
    period: &'a Period,
    method: AllocationMethod,
    building_total_sf: Decimal,
    occupied_tenant_count: usize,
    pool_total: Money,
    category_totals: BTreeMap<ExpenseCategory, Money>,
    payments: &'a BTreeMap<TenantId, Money>,
}

/// Calculate allocation items for a draft reconciliation
///
/// Structural problems abort with an error. Problems with one tenant's lease
/// terms are collected in `CalculationOutcome::errors` and the remaining
/// tenants are still allocated.
pub fn calculate(
    reconciliation: &Reconciliation,
    input: &CalculationInput,
) -> CamResult<CalculationOutcome> {
    if reconciliation.is_finalized {
        return Err(CamError::NotDraft(reconciliation.id));
    }

    let period = &reconciliation.period;
    let building_total_sf = input.building_total_sf;
    if building_total_sf <= Decimal::ZERO {
        return Err(CamError::InvalidInput(format!(
            "building_total_sf must be positive, got {}",
            building_total_sf
        )));
    }

    let expenses = expenses_in_scope(&input.expenses, period)?;
    if input.leases.is_empty() {
        return Err(CamError::InvalidInput("no lease terms supplied".into()));
    }
    for (tenant_id, entry) in &input.occupancy {
        entry.validate(*tenant_id)?;
    }

    let mut errors = Vec::new();
    let mut valid: Vec<&LeaseTerms> = Vec::with_capacity(input.leases.len());
    for (tenant_id, terms) in &input.leases {
        let checked = if *tenant_id != terms.tenant_id {
            Err(CamError::invalid_lease(
                *tenant_id,
                format!("lease terms belong to tenant {}", terms.tenant_id),
            ))
        } else {
            terms.validate()
        };
        match checked {
            Ok(()) => valid.push(terms),
            Err(err) => errors.push(skip_tenant(terms, err)),
        }
    }

    let mut occupied_sf = Decimal::ZERO;
    let mut occupied_tenant_count = 0;
    for terms in &valid {
        let entry = input.occupancy.get(&terms.tenant_id);
        if OccupancyWindow::resolve(terms, entry).occupied_days(period) > 0 {
            occupied_sf += occupied_area(terms, entry);
            occupied_tenant_count += 1;
        }
    }
    if occupied_sf > building_total_sf {
        return Err(CamError::InvalidInput(format!(
            "occupied SF {} exceeds building_total_sf {}",
            occupied_sf, building_total_sf
        )));
    }

    let gross_up = calculate_gross_up(
        &expenses,
        building_total_sf,
        occupied_sf,
        valid.iter().copied(),
    )?;

    let ctx = PoolContext {
        period,
        method: reconciliation.allocation_method,
        building_total_sf,
        occupied_tenant_count,
        pool_total: gross_up.pool_total(),
        category_totals: gross_up.category_totals(),
        payments: &input.payments,
    };

    let mut items = Vec::with_capacity(valid.len());
    for terms in valid {
        let entry = input.occupancy.get(&terms.tenant_id);
        match allocate_tenant(&ctx, terms, entry) {
            Ok(item) => items.push(item),
            Err(err) => errors.push(skip_tenant(terms, err)),
        }
    }

    log::info!(
        "Calculated reconciliation {}: {} tenants allocated, {} skipped, pool {}",
        reconciliation.id,
        items.len(),
        errors.len(),
        ctx.pool_total
    );

    Ok(CalculationOutcome {
        items,
        errors,
        gross_up,
        occupied_sf,
        occupied_tenant_count,
        building_total_sf,
    })
}

/// Expenses whose period lies inside the reconciliation period
fn expenses_in_scope(expenses: &[ExpenseItem], period: &Period) -> CamResult<Vec<ExpenseItem>> {
    let mut in_scope = Vec::with_capacity(expenses.len());
    for expense in expenses {
        expense.validate()?;
        if period.contains(&expense.period) {
            in_scope.push(expense.clone());
        }
    }

    let skipped = expenses.len() - in_scope.len();
    if skipped > 0 {
        log::debug!("{} expense items fall outside {} and were ignored", skipped, period);
    }

    if in_scope.is_empty() {
        return Err(CamError::InvalidInput(format!(
            "no expense items in scope for {}",
            period
        )));
    }
    Ok(in_scope)
}

fn skip_tenant(terms: &LeaseTerms, err: CamError) -> TenantError {
    let message = match err {
        CamError::InvalidLeaseTerms { reason, .. } => reason,
        other => other.to_string(),
    };
    log::warn!("Skipping tenant {}: {}", terms.display_name(), message);
    TenantError {
        tenant_id: terms.tenant_id,
        tenant_name: terms.display_name(),
        message,
    }
}

/// Run steps 1-8 for one tenant
fn allocate_tenant(
    ctx: &PoolContext<'_>,
    terms: &LeaseTerms,
    occupancy: Option<&OccupancyEntry>,
) -> CamResult<ReconciliationItem> {
    // 1. pool and exclusions
    let excluded_amount: Money = ctx
        .category_totals
        .iter()
        .filter(|(category, _)| terms.is_excluded(**category))
        .map(|(_, total)| *total)
        .sum();

    // 2. share
    let share_percent = match ctx.method {
        AllocationMethod::ProRataSf => terms.leased_sf / ctx.building_total_sf,
        AllocationMethod::EqualShare if ctx.occupied_tenant_count == 0 => Decimal::ZERO,
        AllocationMethod::EqualShare => Decimal::ONE / Decimal::from(ctx.occupied_tenant_count),
    };
    let pre_cap_amount = (ctx.pool_total - excluded_amount) * share_percent;

    // 3. admin fee
    let admin_fee = pre_cap_amount * (terms.admin_fee_percent / Decimal::ONE_HUNDRED);
    let allocable = pre_cap_amount + admin_fee;

    // 4-5. base-year and expense-stop credits
    let (base_year_credit, expense_stop_credit) = credits(terms, allocable);
    let after_credits = allocable - base_year_credit - expense_stop_credit;

    // 6. cap
    let cam_cap_applied = cap_reduction(terms, after_credits, ctx.period)?;
    let after_cap = after_credits - cam_cap_applied;

    // 7. proration
    let period_days = ctx.period.days();
    let occupied_days = OccupancyWindow::resolve(terms, occupancy).occupied_days(ctx.period);
    let proration_factor = if occupied_days >= period_days {
        Decimal::ONE
    } else {
        Decimal::from(occupied_days) / Decimal::from(period_days)
    };
    let prorated = after_cap * proration_factor;

    // 8. settle
    let allocated_amount = prorated.round_to_cents();
    let amount_paid = ctx
        .payments
        .get(&terms.tenant_id)
        .copied()
        .unwrap_or_default();

    log::debug!(
        "Tenant {}: share {} pre-cap {} admin {} credits {}/{} cap {} proration {} -> {}",
        terms.display_name(),
        share_percent,
        pre_cap_amount,
        admin_fee,
        base_year_credit,
        expense_stop_credit,
        cam_cap_applied,
        proration_factor,
        allocated_amount
    );

    Ok(ReconciliationItem {
        tenant_id: terms.tenant_id,
        tenant_name: terms.display_name(),
        leased_sf: terms.leased_sf,
        share_percent,
        pool_amount: ctx.pool_total,
        excluded_amount,
        pre_cap_amount,
        admin_fee,
        base_year_credit,
        expense_stop_credit,
        credit_precedence: terms.credit_precedence,
        cam_cap_applied,
        occupied_days,
        period_days,
        proration_factor,
        allocated_amount,
        amount_paid,
        balance_due: allocated_amount - amount_paid,
    })
}

/// Base-year and expense-stop credits; at most one is non-zero
fn credits(terms: &LeaseTerms, allocable: Money) -> (Money, Money) {
    let base_year = terms
        .base_year
        .and(terms.base_year_amount)
        .map(|amount| amount.min(allocable).non_negative());
    let expense_stop = terms
        .expense_stop_absolute()
        .map(|stop| stop.min(allocable).non_negative());

    match (base_year, expense_stop) {
        (Some(base), Some(stop)) => match terms.credit_precedence {
            CreditPrecedence::BaseYear => (base, Money::zero()),
            CreditPrecedence::ExpenseStop => (Money::zero(), stop),
            CreditPrecedence::GreaterCredit if stop > base => (Money::zero(), stop),
            CreditPrecedence::GreaterCredit => (base, Money::zero()),
        },
        (Some(base), None) => (base, Money::zero()),
        (None, Some(stop)) => (Money::zero(), stop),
        (None, None) => (Money::zero(), Money::zero()),
    }
}

/// Ceiling on the post-credit amount for this period
pub fn cap_ceiling(terms: &LeaseTerms, period: &Period) -> CamResult<Option<Money>> {
    if terms.cam_cap_type == CapType::None {
        return Ok(None);
    }

    let reference_year = terms.cap_reference_year().ok_or_else(|| {
        CamError::invalid_lease(terms.tenant_id, "CAM cap has no reference year")
    })?;
    let base = terms.cap_base_amount().ok_or_else(|| {
        CamError::invalid_lease(terms.tenant_id, "CAM cap has no base amount")
    })?;

    let years = period.year() - reference_year;
    if years < 0 {
        return Err(CamError::invalid_lease(
            terms.tenant_id,
            format!(
                "CAM cap reference year {} is after the reconciliation year {}",
                reference_year,
                period.year()
            ),
        ));
    }

    let overflow = || {
        CamError::invalid_lease(
            terms.tenant_id,
            format!("CAM cap ceiling overflows after {} years", years),
        )
    };

    let rate = terms.cam_cap_percent.unwrap_or(Decimal::ZERO) / Decimal::ONE_HUNDRED;
    let growth = match terms.cam_cap_type {
        CapType::Cumulative => rate
            .checked_mul(Decimal::from(years))
            .and_then(|g| g.checked_add(Decimal::ONE)),
        CapType::Compounded => (0..years).try_fold(Decimal::ONE, |factor, _| {
            factor.checked_mul(Decimal::ONE + rate)
        }),
        CapType::None => Some(Decimal::ONE),
    }
    .ok_or_else(overflow)?;

    let ceiling = base.amount().checked_mul(growth).ok_or_else(overflow)?;
    Ok(Some(Money::new(ceiling)))
}

fn cap_reduction(terms: &LeaseTerms, amount: Money, period: &Period) -> CamResult<Money> {
    Ok(match cap_ceiling(terms, period)? {
        Some(ceiling) => (amount - ceiling).non_negative(),
        None => Money::zero(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyId;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn period() -> Period {
        Period::annual(2025).unwrap()
    }

    fn draft(method: AllocationMethod) -> Reconciliation {
        Reconciliation::new_draft(PropertyId::new(), period(), method, dec!(100000))
    }

    fn pool(amount: i64) -> Vec<ExpenseItem> {
        vec![ExpenseItem::new(
            ExpenseCategory::PropertyTax,
            Money::from_dollars(amount),
            period(),
        )]
    }

    #[test]
    fn test_pro_rata_with_expense_stop() {
        let a = LeaseTerms::new(TenantId::new(), dec!(40000)).with_name("A");
        let b = LeaseTerms::new(TenantId::new(), dec!(60000))
            .with_name("B")
            .with_expense_stop(Money::from_dollars(50000), false);
        let (a_id, b_id) = (a.tenant_id, b.tenant_id);
        let input = CalculationInput::new(pool(200000), [a, b], dec!(100000));

        let outcome = calculate(&draft(AllocationMethod::ProRataSf), &input).unwrap();
        let find = |id| outcome.items.iter().find(|i| i.tenant_id == id).unwrap();

        assert!(outcome.errors.is_empty());
        assert_eq!(find(a_id).share_percent, dec!(0.4));
        assert_eq!(find(a_id).allocated_amount, Money::from_dollars(80000));
        assert_eq!(find(b_id).pre_cap_amount, Money::from_dollars(120000));
        assert_eq!(find(b_id).expense_stop_credit, Money::from_dollars(50000));
        assert_eq!(find(b_id).allocated_amount, Money::from_dollars(70000));
    }

    #[test]
    fn test_cumulative_cap() {
        let tenant = LeaseTerms::new(TenantId::new(), dec!(100000)).with_cap(
            CapType::Cumulative,
            dec!(5),
            Money::from_dollars(10000),
            2023,
        );
        let input = CalculationInput::new(pool(12500), [tenant], dec!(100000));

        let outcome = calculate(&draft(AllocationMethod::ProRataSf), &input).unwrap();
        let item = &outcome.items[0];

        assert_eq!(item.cam_cap_applied, Money::from_dollars(1500));
        assert_eq!(item.allocated_amount, Money::from_dollars(11000));
    }

    #[test]
    fn test_compounded_cap() {
        let tenant = LeaseTerms::new(TenantId::new(), dec!(100000)).with_cap(
            CapType::Compounded,
            dec!(10),
            Money::from_dollars(10000),
            2023,
        );
        let input = CalculationInput::new(pool(15000), [tenant], dec!(100000));

        let outcome = calculate(&draft(AllocationMethod::ProRataSf), &input).unwrap();
        // 10,000 * 1.1^2 = 12,100
        assert_eq!(outcome.items[0].allocated_amount, Money::from_dollars(12100));
        assert_eq!(outcome.items[0].cam_cap_applied, Money::from_dollars(2900));
    }

    #[test]
    fn test_exclusion_removed_before_share() {
        let expenses = vec![
            ExpenseItem::new(ExpenseCategory::PropertyTax, Money::from_dollars(80000), period()),
            ExpenseItem::new(ExpenseCategory::Marketing, Money::from_dollars(20000), period()),
        ];
        let tenant = LeaseTerms::new(TenantId::new(), dec!(50000))
            .excluding(ExpenseCategory::Marketing);
        let input = CalculationInput::new(expenses, [tenant], dec!(100000));

        let outcome = calculate(&draft(AllocationMethod::ProRataSf), &input).unwrap();
        let item = &outcome.items[0];

        assert_eq!(item.pool_amount, Money::from_dollars(100000));
        assert_eq!(item.excluded_amount, Money::from_dollars(20000));
        assert_eq!(item.pre_cap_amount, Money::from_dollars(40000));
    }

    #[test]
    fn test_admin_fee_on_pre_cap_amount() {
        let tenant =
            LeaseTerms::new(TenantId::new(), dec!(25000)).with_admin_fee(dec!(15));
        let input = CalculationInput::new(pool(100000), [tenant], dec!(100000));

        let outcome = calculate(&draft(AllocationMethod::ProRataSf), &input).unwrap();
        let item = &outcome.items[0];

        assert_eq!(item.admin_fee, Money::from_dollars(3750));
        assert_eq!(item.allocated_amount, Money::from_dollars(28750));
    }

    #[test]
    fn test_base_year_wins_by_default() {
        let tenant = LeaseTerms::new(TenantId::new(), dec!(50000))
            .with_base_year(2022, Money::from_dollars(30000))
            .with_expense_stop(Money::from_dollars(45000), false);
        let input = CalculationInput::new(pool(100000), [tenant], dec!(100000));

        let outcome = calculate(&draft(AllocationMethod::ProRataSf), &input).unwrap();
        let item = &outcome.items[0];

        assert_eq!(item.base_year_credit, Money::from_dollars(30000));
        assert!(item.expense_stop_credit.is_zero());
        assert_eq!(item.allocated_amount, Money::from_dollars(20000));
    }

    #[test]
    fn test_credit_precedence_flag() {
        let mut tenant = LeaseTerms::new(TenantId::new(), dec!(50000))
            .with_base_year(2022, Money::from_dollars(30000))
            .with_expense_stop(Money::from_dollars(45000), false);
        tenant.credit_precedence = CreditPrecedence::GreaterCredit;
        let input = CalculationInput::new(pool(100000), [tenant], dec!(100000));

        let outcome = calculate(&draft(AllocationMethod::ProRataSf), &input).unwrap();
        let item = &outcome.items[0];

        assert!(item.base_year_credit.is_zero());
        assert_eq!(item.expense_stop_credit, Money::from_dollars(45000));
        assert_eq!(item.credit_precedence, CreditPrecedence::GreaterCredit);
    }

    #[test]
    fn test_credit_never_exceeds_allocable() {
        let tenant = LeaseTerms::new(TenantId::new(), dec!(10000))
            .with_expense_stop(Money::from_dollars(50), true);
        let input = CalculationInput::new(pool(100000), [tenant], dec!(100000));

        let outcome = calculate(&draft(AllocationMethod::ProRataSf), &input).unwrap();
        let item = &outcome.items[0];

        assert_eq!(item.expense_stop_credit, Money::from_dollars(10000));
        assert!(item.allocated_amount.is_zero());
    }

    #[test]
    fn test_equal_share_counts_occupying_tenants() {
        let a = LeaseTerms::new(TenantId::new(), dec!(10000));
        let b = LeaseTerms::new(TenantId::new(), dec!(30000));
        let c = LeaseTerms::new(TenantId::new(), dec!(20000)).with_proration(
            NaiveDate::from_ymd_opt(2026, 1, 1),
            None,
        );
        let c_id = c.tenant_id;
        let input = CalculationInput::new(pool(90000), [a, b, c], dec!(100000));

        let outcome = calculate(&draft(AllocationMethod::EqualShare), &input).unwrap();

        assert_eq!(outcome.occupied_tenant_count, 2);
        for item in &outcome.items {
            if item.tenant_id == c_id {
                assert!(item.proration_factor.is_zero());
                assert!(item.allocated_amount.is_zero());
            } else {
                assert_eq!(item.allocated_amount, Money::from_dollars(45000));
            }
        }
    }

    #[test]
    fn test_partial_year_proration() {
        let tenant = LeaseTerms::new(TenantId::new(), dec!(36500)).with_proration(
            NaiveDate::from_ymd_opt(2025, 7, 1),
            None,
        );
        let input = CalculationInput::new(pool(100000), [tenant], dec!(100000));

        let outcome = calculate(&draft(AllocationMethod::ProRataSf), &input).unwrap();
        let item = &outcome.items[0];

        assert_eq!(item.occupied_days, 184);
        assert_eq!(item.period_days, 365);
        // 36,500 * 184 / 365 = 18,400
        assert_eq!(item.allocated_amount, Money::from_dollars(18400));
    }

    #[test]
    fn test_rounding_happens_once() {
        let tenants: Vec<LeaseTerms> = (0..3)
            .map(|_| LeaseTerms::new(TenantId::new(), dec!(1)))
            .collect();
        let input = CalculationInput::new(pool(100), tenants, dec!(3));

        let outcome = calculate(&draft(AllocationMethod::ProRataSf), &input).unwrap();
        for item in &outcome.items {
            assert_eq!(item.allocated_amount, Money::from_cents(3333));
            assert_ne!(item.pre_cap_amount, item.allocated_amount);
        }
    }

    #[test]
    fn test_balance_due_uses_payments() {
        let tenant = LeaseTerms::new(TenantId::new(), dec!(50000));
        let id = tenant.tenant_id;
        let input = CalculationInput::new(pool(100000), [tenant], dec!(100000))
            .with_payment(id, Money::from_dollars(55000));

        let outcome = calculate(&draft(AllocationMethod::ProRataSf), &input).unwrap();
        assert_eq!(outcome.items[0].amount_paid, Money::from_dollars(55000));
        assert_eq!(outcome.items[0].balance_due, Money::from_dollars(-5000));
    }

    #[test]
    fn test_invalid_tenant_is_skipped_not_fatal() {
        let good = LeaseTerms::new(TenantId::new(), dec!(50000)).with_name("Good");
        let mut bad = LeaseTerms::new(TenantId::new(), dec!(50000)).with_name("Bad");
        bad.cam_cap_type = CapType::Cumulative;
        let input = CalculationInput::new(pool(100000), [good, bad], dec!(100000));

        let outcome = calculate(&draft(AllocationMethod::ProRataSf), &input).unwrap();

        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].tenant_name, "Good");
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].tenant_name, "Bad");
    }

    #[test]
    fn test_cap_year_after_period_is_tenant_error() {
        let tenant = LeaseTerms::new(TenantId::new(), dec!(50000)).with_cap(
            CapType::Cumulative,
            dec!(5),
            Money::from_dollars(10000),
            2027,
        );
        let input = CalculationInput::new(pool(100000), [tenant], dec!(100000));

        let outcome = calculate(&draft(AllocationMethod::ProRataSf), &input).unwrap();
        assert!(outcome.items.is_empty());
        assert!(outcome.errors[0].message.contains("after the reconciliation year"));
    }

    #[test]
    fn test_overflowing_cap_is_tenant_error() {
        let old_cap = LeaseTerms::new(TenantId::new(), dec!(50000))
            .with_name("Old Cap")
            .with_cap(CapType::Compounded, dec!(8), Money::from_dollars(50000), 1200);
        let huge_cap = LeaseTerms::new(TenantId::new(), dec!(25000))
            .with_name("Huge Cap")
            .with_cap(CapType::Compounded, dec!(100), Money::from_dollars(50000), 1900);
        let plain = LeaseTerms::new(TenantId::new(), dec!(25000)).with_name("Plain");
        let input = CalculationInput::new(pool(100000), [old_cap, huge_cap, plain], dec!(100000));

        let outcome = calculate(&draft(AllocationMethod::ProRataSf), &input).unwrap();

        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].tenant_name, "Plain");
        assert_eq!(outcome.errors.len(), 2);
        let huge = outcome
            .errors
            .iter()
            .find(|e| e.tenant_name == "Huge Cap")
            .unwrap();
        assert!(huge.message.contains("overflows"));
    }

    #[test]
    fn test_cap_ceiling_overflow_is_an_error() {
        let terms = LeaseTerms::new(TenantId::new(), dec!(1000)).with_cap(
            CapType::Compounded,
            dec!(100),
            Money::from_dollars(50000),
            1900,
        );
        let err = cap_ceiling(&terms, &period()).unwrap_err();
        assert!(err.is_tenant_scoped());

        let near = LeaseTerms::new(TenantId::new(), dec!(1000)).with_cap(
            CapType::Compounded,
            dec!(8),
            Money::from_dollars(50000),
            1900,
        );
        assert!(cap_ceiling(&near, &period()).unwrap().is_some());
    }

    #[test]
    fn test_invalid_occupancy_snapshot_rejected() {
        let anchor = LeaseTerms::new(TenantId::new(), dec!(50000)).with_gross_up(dec!(95));
        let other = LeaseTerms::new(TenantId::new(), dec!(45000));
        let other_id = other.tenant_id;
        let expenses = vec![ExpenseItem::variable(
            ExpenseCategory::Janitorial,
            Money::from_dollars(40000),
            period(),
        )];

        let mut occupancy = OccupancySnapshot::new();
        occupancy.insert(
            other_id,
            OccupancyEntry {
                leased_sf: dec!(-45000),
                occupied_from: None,
                occupied_to: None,
            },
        );
        let negative = CalculationInput::new(
            expenses.clone(),
            [anchor.clone(), other.clone()],
            dec!(100000),
        )
        .with_occupancy(occupancy);
        assert!(matches!(
            calculate(&draft(AllocationMethod::ProRataSf), &negative),
            Err(CamError::InvalidInput(_))
        ));

        let mut occupancy = OccupancySnapshot::new();
        occupancy.insert(
            other_id,
            OccupancyEntry {
                leased_sf: dec!(45000),
                occupied_from: NaiveDate::from_ymd_opt(2025, 9, 1),
                occupied_to: NaiveDate::from_ymd_opt(2025, 3, 1),
            },
        );
        let inverted = CalculationInput::new(expenses, [anchor, other], dec!(100000))
            .with_occupancy(occupancy);
        assert!(matches!(
            calculate(&draft(AllocationMethod::ProRataSf), &inverted),
            Err(CamError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_structural_errors_abort() {
        let tenant = LeaseTerms::new(TenantId::new(), dec!(50000));
        let rec = draft(AllocationMethod::ProRataSf);

        let no_building = CalculationInput::new(pool(100), [tenant.clone()], Decimal::ZERO);
        assert!(matches!(
            calculate(&rec, &no_building),
            Err(CamError::InvalidInput(_))
        ));

        let no_expenses = CalculationInput::new(Vec::new(), [tenant.clone()], dec!(100000));
        assert!(matches!(
            calculate(&rec, &no_expenses),
            Err(CamError::InvalidInput(_))
        ));

        let oversubscribed = CalculationInput::new(pool(100), [tenant], dec!(10000));
        assert!(matches!(
            calculate(&rec, &oversubscribed),
            Err(CamError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_expenses_outside_period_ignored() {
        let mut expenses = pool(100000);
        expenses.push(ExpenseItem::new(
            ExpenseCategory::Legal,
            Money::from_dollars(5000),
            Period::annual(2024).unwrap(),
        ));
        let tenant = LeaseTerms::new(TenantId::new(), dec!(100000));
        let input = CalculationInput::new(expenses, [tenant], dec!(100000));

        let outcome = calculate(&draft(AllocationMethod::ProRataSf), &input).unwrap();
        assert_eq!(outcome.gross_up.raw_total, Money::from_dollars(100000));
    }

    #[test]
    fn test_finalized_rejected() {
        let mut rec = draft(AllocationMethod::ProRataSf);
        rec.is_finalized = true;
        let input = CalculationInput::new(
            pool(100),
            [LeaseTerms::new(TenantId::new(), dec!(10))],
            dec!(100),
        );
        assert!(matches!(calculate(&rec, &input), Err(CamError::NotDraft(_))));
    }
}
