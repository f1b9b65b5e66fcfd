//! Service layer
//!
//! `gross_up` and `allocation` are the pure calculation engine.
//! `aggregator` applies a calculation to a reconciliation record and drives
//! its draft/finalized lifecycle. `reconciliation` wraps all of that with
//! persistence, optimistic versioning and the audit trail.

pub mod aggregator;
pub mod allocation;
pub mod gross_up;
pub mod reconciliation;

pub use aggregator::{finalize, variance, Variance};
pub use allocation::{cap_ceiling, CalculationInput, CalculationOutcome};
pub use gross_up::{calculate_gross_up, AdjustedExpense, GrossUpResult};
pub use reconciliation::ReconciliationService;
