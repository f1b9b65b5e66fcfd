//! Custom error types for the CAM engine
//!
//! This module defines the error hierarchy for the engine using thiserror
//! for ergonomic error definitions.
//!
//! Errors fall into two scopes. Structural errors (`InvalidInput`, `NotDraft`,
//! `EmptyAllocation`, `VersionConflict`) abort the whole operation. Lease-term
//! errors (`InvalidLeaseTerms`) are scoped to a single tenant and are collected
//! alongside the successful allocations of the remaining tenants.

use thiserror::Error;

use crate::models::{ReconciliationId, TenantId};

/// The main error type for CAM engine operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CamError {
    /// Malformed or missing structural input (building SF, occupancy, expenses)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A single tenant's lease terms are internally inconsistent
    #[error("Invalid lease terms for tenant {tenant_id}: {reason}")]
    InvalidLeaseTerms { tenant_id: TenantId, reason: String },

    /// Attempted mutation of a finalized reconciliation
    #[error("Reconciliation {0} is finalized and can no longer be modified")]
    NotDraft(ReconciliationId),

    /// Finalize attempted with no allocation items
    #[error("Reconciliation {0} has no allocations to finalize")]
    EmptyAllocation(ReconciliationId),

    /// Optimistic concurrency check failed
    #[error("Reconciliation was modified concurrently: expected version {expected}, found {actual}")]
    VersionConflict { expected: u64, actual: u64 },

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

impl CamError {
    /// Create a lease-terms error for a tenant
    pub fn invalid_lease(tenant_id: TenantId, reason: impl Into<String>) -> Self {
        Self::InvalidLeaseTerms {
            tenant_id,
            reason: reason.into(),
        }
    }

    /// Create a "not found" error for reconciliations
    pub fn reconciliation_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Reconciliation",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for tenants
    pub fn tenant_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Tenant",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error was raised against a finalized reconciliation
    pub fn is_not_draft(&self) -> bool {
        matches!(self, Self::NotDraft(_))
    }

    /// Check if this error only affects a single tenant
    pub fn is_tenant_scoped(&self) -> bool {
        matches!(self, Self::InvalidLeaseTerms { .. })
    }
}

impl From<std::io::Error> for CamError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CamError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for CAM engine operations
pub type CamResult<T> = Result<T, CamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CamError::InvalidInput("building_total_sf must be positive".into());
        assert_eq!(
            err.to_string(),
            "Invalid input: building_total_sf must be positive"
        );
    }

    #[test]
    fn test_not_found_error() {
        let err = CamError::reconciliation_not_found("rec-1234");
        assert_eq!(err.to_string(), "Reconciliation not found: rec-1234");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_tenant_scope() {
        let tenant = TenantId::new();
        let err = CamError::invalid_lease(tenant, "cap type set without base or percent");
        assert!(err.is_tenant_scoped());
        assert!(err.to_string().contains("cap type set without base or percent"));

        let structural = CamError::InvalidInput("no expenses".into());
        assert!(!structural.is_tenant_scoped());
    }

    #[test]
    fn test_not_draft() {
        let err = CamError::NotDraft(ReconciliationId::new());
        assert!(err.is_not_draft());
        assert!(err.to_string().contains("finalized"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cam_err: CamError = io_err.into();
        assert!(matches!(cam_err, CamError::Io(_)));
    }
}
