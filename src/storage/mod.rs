//! Storage layer for the CLI harness
//!
//! JSON file storage with atomic writes, plus the audit log. The engine
//! itself never touches storage; services load records here, run the engine
//! and commit the result.

pub mod file_io;
pub mod reconciliations;

pub use file_io::{read_json, read_json_required, write_json_atomic};
pub use reconciliations::ReconciliationRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType, Operation};
use crate::config::paths::CamPaths;
use crate::error::CamResult;

/// Storage coordinator: repositories and the audit log
pub struct Storage {
    paths: CamPaths,
    pub reconciliations: ReconciliationRepository,
    audit: AuditLogger,
    audit_enabled: bool,
}

impl Storage {
    /// Create storage rooted at `paths`, creating directories as needed
    pub fn new(paths: CamPaths) -> CamResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            reconciliations: ReconciliationRepository::new(paths.reconciliations_file()),
            audit: AuditLogger::new(paths.audit_log()),
            audit_enabled: true,
            paths,
        })
    }

    /// Turn audit logging on or off
    pub fn with_audit(mut self, enabled: bool) -> Self {
        self.audit_enabled = enabled;
        self
    }

    pub fn paths(&self) -> &CamPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&self) -> CamResult<()> {
        self.reconciliations.load()
    }

    /// Save all data to disk
    pub fn save_all(&self) -> CamResult<()> {
        self.reconciliations.save()
    }

    /// Record a create operation
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        version: u64,
        entity: &T,
    ) -> CamResult<()> {
        if !self.audit_enabled {
            return Ok(());
        }
        let entry = AuditEntry::create(entity_type, entity_id, entity_name, version, entity);
        self.audit.log(&entry)
    }

    /// Record a state transition
    #[allow(clippy::too_many_arguments)]
    pub fn log_transition<T: Serialize>(
        &self,
        operation: Operation,
        entity_type: EntityType,
        entity_id: String,
        entity_name: Option<String>,
        version: u64,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> CamResult<()> {
        if !self.audit_enabled {
            return Ok(());
        }
        let entry = AuditEntry::transition(
            operation,
            entity_type,
            entity_id,
            entity_name,
            version,
            before,
            after,
            diff_summary,
        );
        self.audit.log(&entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CamPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert_eq!(storage.reconciliations.count().unwrap(), 0);
    }

    #[test]
    fn test_audit_can_be_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CamPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap().with_audit(false);

        storage
            .log_create(EntityType::Reconciliation, "rec-1".into(), None, 0, &json!({}))
            .unwrap();
        assert!(storage.audit().read_all().unwrap().is_empty());
    }
}
