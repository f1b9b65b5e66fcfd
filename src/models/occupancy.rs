//! Occupancy snapshot supplied alongside the lease terms
//!
//! The snapshot says which tenants physically occupied their space during the
//! period. It feeds both the occupied-area figure used by gross-up and each
//! tenant's proration window.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ids::TenantId;
use super::lease::LeaseTerms;
use super::period::Period;
use crate::error::{CamError, CamResult};

/// One tenant's occupancy during the period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyEntry {
    pub leased_sf: Decimal,
    #[serde(default)]
    pub occupied_from: Option<NaiveDate>,
    #[serde(default)]
    pub occupied_to: Option<NaiveDate>,
}

impl OccupancyEntry {
    /// Reject non-positive area and inverted windows
    pub fn validate(&self, tenant_id: TenantId) -> CamResult<()> {
        if self.leased_sf <= Decimal::ZERO {
            return Err(CamError::InvalidInput(format!(
                "occupancy for tenant {}: leased_sf must be positive, got {}",
                tenant_id, self.leased_sf
            )));
        }
        if let (Some(from), Some(to)) = (self.occupied_from, self.occupied_to) {
            if to < from {
                return Err(CamError::InvalidInput(format!(
                    "occupancy for tenant {}: occupied_to {} is before occupied_from {}",
                    tenant_id, to, from
                )));
            }
        }
        Ok(())
    }
}

/// Occupancy for every tenant, keyed by tenant
pub type OccupancySnapshot = BTreeMap<TenantId, OccupancyEntry>;

/// Effective occupancy of one tenant within a period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl OccupancyWindow {
    /// Intersect the lease proration window with the snapshot window
    ///
    /// A missing snapshot entry leaves the lease window unchanged.
    pub fn resolve(terms: &LeaseTerms, entry: Option<&OccupancyEntry>) -> Self {
        let from = entry.and_then(|e| e.occupied_from);
        let to = entry.and_then(|e| e.occupied_to);
        Self {
            start: later(terms.proration_start, from),
            end: earlier(terms.proration_end, to),
        }
    }

    /// Days of the period covered by this window
    pub fn occupied_days(&self, period: &Period) -> i64 {
        period.overlap_days(self.start, self.end)
    }
}

/// Leased area that counts toward occupied SF
///
/// The snapshot entry's figure wins when present.
pub fn occupied_area(terms: &LeaseTerms, entry: Option<&OccupancyEntry>) -> Decimal {
    entry.map_or(terms.leased_sf, |e| e.leased_sf)
}

fn later(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.max(y)),
        (x, None) => x,
        (None, y) => y,
    }
}

fn earlier(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<NaiveDate> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (x, None) => x,
        (None, y) => y,
    }
}
