//! Per-tenant CAM lease provisions
//!
//! A `LeaseTerms` value is a read-only snapshot of what one tenant negotiated.
//! The engine never mutates it and never looks it up from shared state during
//! a calculation; callers pass the whole snapshot map in.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::category::ExpenseCategory;
use super::ids::TenantId;
use super::money::Money;
use crate::error::{CamError, CamResult};

/// Earliest base year or cap reference year a lease may name
pub const MIN_REFERENCE_YEAR: i32 = 1900;

/// How a CAM cap grows from its base amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CapType {
    #[default]
    None,
    /// Simple growth: `base * (1 + pct * years)`
    Cumulative,
    /// Compound growth: `base * (1 + pct)^years`
    Compounded,
}

impl fmt::Display for CapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapType::None => write!(f, "None"),
            CapType::Cumulative => write!(f, "Cumulative"),
            CapType::Compounded => write!(f, "Compounded"),
        }
    }
}

/// Which credit applies when a lease sets both a base year and an expense stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CreditPrecedence {
    /// Base-year credit applies, expense-stop credit is forced to zero
    #[default]
    BaseYear,
    /// Expense-stop credit applies, base-year credit is forced to zero
    ExpenseStop,
    /// Whichever credit is larger applies, the other is forced to zero
    GreaterCredit,
}

impl fmt::Display for CreditPrecedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreditPrecedence::BaseYear => write!(f, "base year"),
            CreditPrecedence::ExpenseStop => write!(f, "expense stop"),
            CreditPrecedence::GreaterCredit => write!(f, "greater credit"),
        }
    }
}

/// CAM provisions for one tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseTerms {
    pub tenant_id: TenantId,
    #[serde(default)]
    pub tenant_name: String,
    pub leased_sf: Decimal,

    #[serde(default)]
    pub cam_cap_type: CapType,
    #[serde(default)]
    pub cam_cap_percent: Option<Decimal>,
    #[serde(default)]
    pub cam_cap_base_amount: Option<Money>,
    /// Year the cap grows from; falls back to `base_year`
    #[serde(default)]
    pub cam_cap_base_year: Option<i32>,

    #[serde(default)]
    pub base_year: Option<i32>,
    #[serde(default)]
    pub base_year_amount: Option<Money>,

    #[serde(default)]
    pub expense_stop_amount: Option<Money>,
    #[serde(default)]
    pub expense_stop_per_sf: bool,
    #[serde(default)]
    pub credit_precedence: CreditPrecedence,

    #[serde(default)]
    pub has_gross_up: bool,
    /// Target occupancy as a percentage (0-100)
    #[serde(default)]
    pub gross_up_occupancy_threshold: Option<Decimal>,

    #[serde(default)]
    pub admin_fee_percent: Decimal,
    #[serde(default)]
    pub excluded_categories: BTreeSet<ExpenseCategory>,

    #[serde(default)]
    pub proration_start: Option<NaiveDate>,
    #[serde(default)]
    pub proration_end: Option<NaiveDate>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl LeaseTerms {
    /// Create plain lease terms with no special provisions
    pub fn new(tenant_id: TenantId, leased_sf: Decimal) -> Self {
        Self {
            tenant_id,
            tenant_name: String::new(),
            leased_sf,
            cam_cap_type: CapType::None,
            cam_cap_percent: None,
            cam_cap_base_amount: None,
            cam_cap_base_year: None,
            base_year: None,
            base_year_amount: None,
            expense_stop_amount: None,
            expense_stop_per_sf: false,
            credit_precedence: CreditPrecedence::default(),
            has_gross_up: false,
            gross_up_occupancy_threshold: None,
            admin_fee_percent: Decimal::ZERO,
            excluded_categories: BTreeSet::new(),
            proration_start: None,
            proration_end: None,
            notes: None,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.tenant_name = name.into();
        self
    }

    /// Configure a CAM cap
    pub fn with_cap(
        mut self,
        cap_type: CapType,
        percent: Decimal,
        base_amount: Money,
        base_year: i32,
    ) -> Self {
        self.cam_cap_type = cap_type;
        self.cam_cap_percent = Some(percent);
        self.cam_cap_base_amount = Some(base_amount);
        self.cam_cap_base_year = Some(base_year);
        self
    }

    /// Configure a base year
    pub fn with_base_year(mut self, year: i32, amount: Money) -> Self {
        self.base_year = Some(year);
        self.base_year_amount = Some(amount);
        self
    }

    /// Configure an expense stop (absolute or per-SF)
    pub fn with_expense_stop(mut self, amount: Money, per_sf: bool) -> Self {
        self.expense_stop_amount = Some(amount);
        self.expense_stop_per_sf = per_sf;
        self
    }

    /// Configure a gross-up provision with a threshold percentage
    pub fn with_gross_up(mut self, threshold_percent: Decimal) -> Self {
        self.has_gross_up = true;
        self.gross_up_occupancy_threshold = Some(threshold_percent);
        self
    }

    /// Set the admin fee percentage
    pub fn with_admin_fee(mut self, percent: Decimal) -> Self {
        self.admin_fee_percent = percent;
        self
    }

    /// Exclude a category from this tenant's pool
    pub fn excluding(mut self, category: ExpenseCategory) -> Self {
        self.excluded_categories.insert(category);
        self
    }

    /// Set the occupancy window within the period
    pub fn with_proration(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.proration_start = start;
        self.proration_end = end;
        self
    }

    /// Name for display, falling back to the tenant ID
    pub fn display_name(&self) -> String {
        if self.tenant_name.is_empty() {
            self.tenant_id.to_string()
        } else {
            self.tenant_name.clone()
        }
    }

    /// Whether a category is excluded from this tenant's pool
    pub fn is_excluded(&self, category: ExpenseCategory) -> bool {
        self.excluded_categories.contains(&category)
    }

    /// Year the CAM cap grows from
    pub fn cap_reference_year(&self) -> Option<i32> {
        self.cam_cap_base_year.or(self.base_year)
    }

    /// Amount the CAM cap grows from
    pub fn cap_base_amount(&self) -> Option<Money> {
        self.cam_cap_base_amount.or(self.base_year_amount)
    }

    /// Expense stop as an absolute annual dollar figure
    pub fn expense_stop_absolute(&self) -> Option<Money> {
        self.expense_stop_amount.map(|amount| {
            if self.expense_stop_per_sf {
                amount * self.leased_sf
            } else {
                amount
            }
        })
    }

    /// Check internal consistency of the terms
    ///
    /// Period-dependent checks (a cap reference year after the period) are
    /// made by the allocation engine.
    pub fn validate(&self) -> CamResult<()> {
        let invalid = |reason: String| Err(CamError::invalid_lease(self.tenant_id, reason));

        if self.leased_sf <= Decimal::ZERO {
            return invalid(format!("leased_sf must be positive, got {}", self.leased_sf));
        }

        if self.cam_cap_type != CapType::None {
            if self.cam_cap_percent.is_none() && self.cam_cap_base_amount.is_none() {
                return invalid(format!(
                    "{} CAM cap requires cam_cap_percent or cam_cap_base_amount",
                    self.cam_cap_type
                ));
            }
            if self.cap_base_amount().is_none() {
                return invalid(
                    "CAM cap has no base amount (set cam_cap_base_amount or base_year_amount)"
                        .into(),
                );
            }
            if self.cap_reference_year().is_none() {
                return invalid(
                    "CAM cap has no reference year (set cam_cap_base_year or base_year)".into(),
                );
            }
        }
        if let Some(percent) = self.cam_cap_percent {
            if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
                return invalid(format!(
                    "cam_cap_percent must be between 0 and 100, got {}",
                    percent
                ));
            }
        }
        for year in [self.cam_cap_base_year, self.base_year].into_iter().flatten() {
            if year < MIN_REFERENCE_YEAR {
                return invalid(format!(
                    "reference year {} is before {}",
                    year, MIN_REFERENCE_YEAR
                ));
            }
        }
        if matches!(self.cam_cap_base_amount, Some(m) if m.is_negative()) {
            return invalid("cam_cap_base_amount cannot be negative".into());
        }

        if self.base_year.is_some() {
            match self.base_year_amount {
                None => return invalid("base_year is set without base_year_amount".into()),
                Some(m) if m.is_negative() => {
                    return invalid("base_year_amount cannot be negative".into())
                }
                Some(_) => {}
            }
        }

        if matches!(self.expense_stop_amount, Some(m) if m.is_negative()) {
            return invalid("expense_stop_amount cannot be negative".into());
        }

        if self.has_gross_up && self.gross_up_occupancy_threshold.is_none() {
            return invalid("gross-up requires gross_up_occupancy_threshold".into());
        }
        if let Some(threshold) = self.gross_up_occupancy_threshold {
            if threshold < Decimal::ZERO || threshold > Decimal::ONE_HUNDRED {
                return invalid(format!(
                    "gross_up_occupancy_threshold must be between 0 and 100, got {}",
                    threshold
                ));
            }
        }

        if self.admin_fee_percent < Decimal::ZERO {
            return invalid("admin_fee_percent cannot be negative".into());
        }

        if let (Some(start), Some(end)) = (self.proration_start, self.proration_end) {
            if end < start {
                return invalid(format!(
                    "proration_end {} is before proration_start {}",
                    end, start
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_plain_terms_are_valid() {
        let terms = LeaseTerms::new(TenantId::new(), dec!(40000));
        assert!(terms.validate().is_ok());
        assert_eq!(terms.cam_cap_type, CapType::None);
        assert_eq!(terms.credit_precedence, CreditPrecedence::BaseYear);
    }

    #[test]
    fn test_non_positive_sf_rejected() {
        let terms = LeaseTerms::new(TenantId::new(), dec!(0));
        let err = terms.validate().unwrap_err();
        assert!(err.is_tenant_scoped());
    }

    #[test]
    fn test_cap_without_percent_or_base_rejected() {
        let mut terms = LeaseTerms::new(TenantId::new(), dec!(1000));
        terms.cam_cap_type = CapType::Cumulative;
        terms.cam_cap_base_year = Some(2023);
        let err = terms.validate().unwrap_err();
        assert!(err.to_string().contains("cam_cap_percent or cam_cap_base_amount"));
    }

    #[test]
    fn test_cap_falls_back_to_base_year() {
        let mut terms = LeaseTerms::new(TenantId::new(), dec!(1000))
            .with_base_year(2022, Money::from_dollars(9000));
        terms.cam_cap_type = CapType::Compounded;
        terms.cam_cap_percent = Some(dec!(3));

        assert!(terms.validate().is_ok());
        assert_eq!(terms.cap_reference_year(), Some(2022));
        assert_eq!(terms.cap_base_amount(), Some(Money::from_dollars(9000)));
    }

    #[test]
    fn test_cap_without_reference_year_rejected() {
        let mut terms = LeaseTerms::new(TenantId::new(), dec!(1000));
        terms.cam_cap_type = CapType::Cumulative;
        terms.cam_cap_percent = Some(dec!(5));
        terms.cam_cap_base_amount = Some(Money::from_dollars(10000));
        assert!(terms.validate().is_err());
    }

    #[test]
    fn test_cap_percent_and_year_bounds() {
        let cap = |percent, year| {
            LeaseTerms::new(TenantId::new(), dec!(1000)).with_cap(
                CapType::Compounded,
                percent,
                Money::from_dollars(50000),
                year,
            )
        };
        assert!(cap(dec!(100), MIN_REFERENCE_YEAR).validate().is_ok());
        assert!(cap(dec!(100.5), 2020).validate().is_err());
        assert!(cap(dec!(8), 1200).validate().unwrap_err().is_tenant_scoped());

        let old_base_year = LeaseTerms::new(TenantId::new(), dec!(1000))
            .with_base_year(1850, Money::from_dollars(1000));
        assert!(old_base_year.validate().is_err());
    }

    #[test]
    fn test_gross_up_threshold_bounds() {
        let terms = LeaseTerms::new(TenantId::new(), dec!(1000)).with_gross_up(dec!(105));
        assert!(terms.validate().is_err());

        let mut missing = LeaseTerms::new(TenantId::new(), dec!(1000));
        missing.has_gross_up = true;
        assert!(missing.validate().is_err());

        let ok = LeaseTerms::new(TenantId::new(), dec!(1000)).with_gross_up(dec!(95));
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_expense_stop_per_sf() {
        let terms = LeaseTerms::new(TenantId::new(), dec!(2500))
            .with_expense_stop(Money::from_dollars(4), true);
        assert_eq!(terms.expense_stop_absolute(), Some(Money::from_dollars(10000)));

        let absolute = LeaseTerms::new(TenantId::new(), dec!(2500))
            .with_expense_stop(Money::from_dollars(4), false);
        assert_eq!(absolute.expense_stop_absolute(), Some(Money::from_dollars(4)));
    }

    #[test]
    fn test_inverted_proration_rejected() {
        let terms = LeaseTerms::new(TenantId::new(), dec!(1000)).with_proration(
            NaiveDate::from_ymd_opt(2025, 6, 1),
            NaiveDate::from_ymd_opt(2025, 3, 1),
        );
        assert!(terms.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "tenant_id": "550e8400-e29b-41d4-a716-446655440000",
            "leased_sf": "60000",
            "expense_stop_amount": "50000",
            "excluded_categories": ["marketing", "capital_improvement"]
        }"#;
        let terms: LeaseTerms = serde_json::from_str(json).unwrap();
        assert_eq!(terms.leased_sf, dec!(60000));
        assert!(terms.is_excluded(ExpenseCategory::Marketing));
        assert!(!terms.expense_stop_per_sf);
        assert_eq!(terms.admin_fee_percent, Decimal::ZERO);
    }
}
