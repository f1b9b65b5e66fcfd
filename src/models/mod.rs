//! Core data models for the CAM engine
//!
//! This module contains the plain records the engine consumes and produces:
//! expense items, lease terms, occupancy, reconciliations and their items.

pub mod category;
pub mod expense;
pub mod ids;
pub mod lease;
pub mod money;
pub mod occupancy;
pub mod period;
pub mod reconciliation;

pub use category::ExpenseCategory;
pub use expense::ExpenseItem;
pub use ids::{ExpenseItemId, PropertyId, ReconciliationId, TenantId};
pub use lease::{CapType, CreditPrecedence, LeaseTerms};
pub use money::Money;
pub use occupancy::{OccupancyEntry, OccupancySnapshot, OccupancyWindow};
pub use period::{Period, PeriodKind};
pub use reconciliation::{
    AllocationMethod, CategoryTotal, Reconciliation, ReconciliationItem, ReconciliationStatus,
    TenantError,
};
