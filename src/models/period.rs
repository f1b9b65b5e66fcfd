//! Reconciliation period representation
//!
//! A period is an inclusive date range tagged with its kind (monthly,
//! quarterly or annual). Day counts are inclusive on both ends, so a full
//! calendar year has 365 or 366 days.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CamError, CamResult};

/// The cadence of a reconciliation period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Monthly,
    Quarterly,
    #[default]
    Annual,
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKind::Monthly => write!(f, "Monthly"),
            PeriodKind::Quarterly => write!(f, "Quarterly"),
            PeriodKind::Annual => write!(f, "Annual"),
        }
    }
}

/// An inclusive date range used for reconciliations and expense items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub kind: PeriodKind,
}

impl Period {
    /// Create a period from explicit bounds
    pub fn new(start: NaiveDate, end: NaiveDate, kind: PeriodKind) -> CamResult<Self> {
        let period = Self { start, end, kind };
        period.validate()?;
        Ok(period)
    }

    /// Create a calendar-month period
    pub fn monthly(year: i32, month: u32) -> CamResult<Self> {
        let start = ymd(year, month, 1)?;
        let end = if month == 12 {
            ymd(year + 1, 1, 1)?
        } else {
            ymd(year, month + 1, 1)?
        }
        .pred_opt()
        .ok_or_else(|| CamError::InvalidInput(format!("Invalid month {}-{}", year, month)))?;

        Self::new(start, end, PeriodKind::Monthly)
    }

    /// Create a calendar-quarter period (quarter is 1-4)
    pub fn quarterly(year: i32, quarter: u32) -> CamResult<Self> {
        if !(1..=4).contains(&quarter) {
            return Err(CamError::InvalidInput(format!(
                "Quarter must be between 1 and 4, got {}",
                quarter
            )));
        }
        let first_month = (quarter - 1) * 3 + 1;
        let start = ymd(year, first_month, 1)?;
        let end = Self::monthly(year, first_month + 2)?.end;
        Self::new(start, end, PeriodKind::Quarterly)
    }

    /// Create a calendar-year period
    pub fn annual(year: i32) -> CamResult<Self> {
        Self::new(ymd(year, 1, 1)?, ymd(year, 12, 31)?, PeriodKind::Annual)
    }

    /// Validate that the period bounds are ordered
    pub fn validate(&self) -> CamResult<()> {
        if self.end < self.start {
            return Err(CamError::InvalidInput(format!(
                "Period end {} is before start {}",
                self.end, self.start
            )));
        }
        Ok(())
    }

    /// The year a reconciliation period belongs to (year of its start date)
    pub fn year(&self) -> i32 {
        self.start.year()
    }

    /// Number of days in the period, inclusive
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Check if a date falls within the period
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Check if another period lies entirely within this one
    pub fn contains(&self, other: &Period) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Days of this period covered by an optional `[from, to]` window
    ///
    /// Open bounds extend to the period edge. Returns 0 when the window does
    /// not overlap the period.
    pub fn overlap_days(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> i64 {
        let start = from.map_or(self.start, |d| d.max(self.start));
        let end = to.map_or(self.end, |d| d.min(self.end));
        if end < start {
            0
        } else {
            (end - start).num_days() + 1
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} to {}", self.kind, self.start, self.end)
    }
}

fn ymd(year: i32, month: u32, day: u32) -> CamResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| CamError::InvalidInput(format!("Invalid date {}-{}-{}", year, month, day)))
}
