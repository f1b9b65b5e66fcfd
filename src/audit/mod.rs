//! Audit trail for reconciliations
//!
//! Every lifecycle transition (create, calculate, finalize) is appended to a
//! line-delimited JSON log with before/after snapshots.
//!
//! - `AuditEntry`: one logged operation
//! - `AuditLogger`: appends entries to the JSONL file and reads them back
//! - `reconciliation_diff`: human-readable summary of what changed
//!
//! # Example
//!
//! ```rust,ignore
//! use cam_engine::audit::{AuditEntry, AuditLogger, EntityType, Operation, reconciliation_diff};
//!
//! let logger = AuditLogger::new(audit_log_path);
//! let entry = AuditEntry::transition(
//!     Operation::Calculate,
//!     EntityType::Reconciliation,
//!     rec.id.to_string(),
//!     None,
//!     rec.version,
//!     &before,
//!     &rec,
//!     reconciliation_diff(&before, &rec),
//! );
//! logger.log(&entry)?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::reconciliation_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
