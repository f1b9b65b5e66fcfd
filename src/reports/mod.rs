//! Reports over calculated reconciliations
//!
//! Reports are pure functions of a stored `Reconciliation`; they never rerun
//! the engine.

pub mod reconciliation;
pub mod statement;

pub use reconciliation::{ReconciliationReport, ReportTotals, TenantAllocationRow};
pub use statement::{StatementLine, TenantStatement};
