//! Calculation request files
//!
//! The `calculate` command reads everything a calculation needs from one JSON
//! document:
//!
//! ```json
//! {
//!   "property_id": "6f1c...",
//!   "period": { "start": "2025-01-01", "end": "2025-12-31", "kind": "annual" },
//!   "allocation_method": "pro_rata_sf",
//!   "building_total_sf": "100000",
//!   "expenses": [ { "category": "property_tax", "amount": "200000", "period": { ... } } ],
//!   "leases": [ { "tenant_id": "...", "tenant_name": "Acme", "leased_sf": "40000" } ],
//!   "occupancy": { "<tenant_id>": { "leased_sf": "40000" } },
//!   "payments": { "<tenant_id>": "75000" }
//! }
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::Settings;
use crate::error::{CamError, CamResult};
use crate::models::{
    AllocationMethod, CreditPrecedence, ExpenseItem, LeaseTerms, Money, OccupancySnapshot, Period,
    PropertyId, Reconciliation, ReconciliationId, TenantId,
};
use crate::services::CalculationInput;

/// Contents of a calculation request file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Recalculate this draft instead of creating a new one
    #[serde(default)]
    pub reconciliation_id: Option<ReconciliationId>,
    #[serde(default)]
    pub property_id: Option<PropertyId>,
    pub period: Period,
    #[serde(default)]
    pub allocation_method: Option<AllocationMethod>,
    /// Precedence for leases left at the default
    #[serde(default)]
    pub credit_precedence: Option<CreditPrecedence>,
    pub building_total_sf: Decimal,
    pub expenses: Vec<ExpenseItem>,
    pub leases: Vec<LeaseTerms>,
    #[serde(default)]
    pub occupancy: OccupancySnapshot,
    #[serde(default)]
    pub payments: BTreeMap<TenantId, Money>,
}

impl CalculationRequest {
    /// Read and parse a request file
    pub fn from_file(path: &Path) -> CamResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CamError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> CamResult<Self> {
        let request: Self = serde_json::from_str(json)
            .map_err(|e| CamError::InvalidInput(format!("Invalid calculation request: {}", e)))?;
        request.period.validate()?;
        Ok(request)
    }

    /// Allocation method, falling back to the settings default
    pub fn allocation_method(&self, settings: &Settings) -> AllocationMethod {
        self.allocation_method
            .unwrap_or(settings.default_allocation_method)
    }

    /// Check the request agrees with the draft it recalculates
    ///
    /// A draft keeps its period and allocation method for life. Building SF
    /// is taken from each request.
    pub fn check_target(&self, rec: &Reconciliation) -> CamResult<()> {
        if self.period != rec.period {
            return Err(CamError::InvalidInput(format!(
                "request period {} does not match reconciliation {} ({})",
                self.period, rec.id, rec.period
            )));
        }
        if let Some(method) = self.allocation_method {
            if method != rec.allocation_method {
                return Err(CamError::InvalidInput(format!(
                    "request allocation_method '{}' does not match reconciliation {} ('{}')",
                    method, rec.id, rec.allocation_method
                )));
            }
        }
        Ok(())
    }

    /// Build the engine input
    ///
    /// Leases at the default precedence take the request's precedence, or
    /// the settings default when the request has none.
    pub fn to_input(&self, settings: &Settings) -> CalculationInput {
        let precedence = self
            .credit_precedence
            .unwrap_or(settings.default_credit_precedence);

        let leases = self.leases.iter().cloned().map(|mut lease| {
            if lease.credit_precedence == CreditPrecedence::default() {
                lease.credit_precedence = precedence;
            }
            lease
        });

        let mut input = CalculationInput::new(self.expenses.clone(), leases, self.building_total_sf)
            .with_occupancy(self.occupancy.clone());
        input.payments = self.payments.clone();
        input
    }
}
