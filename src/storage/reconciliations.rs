//! Reconciliation repository
//!
//! Stores reconciliations in `reconciliations.json`. Every mutation of an
//! existing record goes through [`ReconciliationRepository::update`], which
//! holds the write lock for the whole mutation and checks the caller's
//! expected version before committing.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{CamError, CamResult};
use crate::models::{PropertyId, Reconciliation, ReconciliationId};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ReconciliationData {
    reconciliations: Vec<Reconciliation>,
}

/// Repository for reconciliation persistence
pub struct ReconciliationRepository {
    path: PathBuf,
    data: RwLock<BTreeMap<ReconciliationId, Reconciliation>>,
}

impl ReconciliationRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(BTreeMap::new()),
        }
    }

    fn read(&self) -> CamResult<RwLockReadGuard<'_, BTreeMap<ReconciliationId, Reconciliation>>> {
        self.data
            .read()
            .map_err(|e| CamError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(
        &self,
    ) -> CamResult<RwLockWriteGuard<'_, BTreeMap<ReconciliationId, Reconciliation>>> {
        self.data
            .write()
            .map_err(|e| CamError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load reconciliations from disk
    pub fn load(&self) -> CamResult<()> {
        let file_data: ReconciliationData = read_json(&self.path)?;

        let mut data = self.write()?;
        data.clear();
        for rec in file_data.reconciliations {
            data.insert(rec.id, rec);
        }

        Ok(())
    }

    /// Save reconciliations to disk
    pub fn save(&self) -> CamResult<()> {
        let data = self.read()?;
        let file_data = ReconciliationData {
            reconciliations: data.values().cloned().collect(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn get(&self, id: ReconciliationId) -> CamResult<Option<Reconciliation>> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// All reconciliations, newest first
    pub fn get_all(&self) -> CamResult<Vec<Reconciliation>> {
        let mut all: Vec<_> = self.read()?.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    /// Reconciliations for one property, newest first
    pub fn get_by_property(&self, property_id: PropertyId) -> CamResult<Vec<Reconciliation>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|r| r.property_id == property_id)
            .collect())
    }

    /// Insert a new record; existing IDs are rejected
    pub fn insert(&self, reconciliation: Reconciliation) -> CamResult<()> {
        let mut data = self.write()?;
        if data.contains_key(&reconciliation.id) {
            return Err(CamError::Storage(format!(
                "Reconciliation {} already exists",
                reconciliation.id
            )));
        }
        data.insert(reconciliation.id, reconciliation);
        Ok(())
    }

    /// Apply `f` to a record if its version matches
    ///
    /// `f` works on a copy. The stored record is replaced only when `f`
    /// returns `Ok`, so a failed mutation leaves the previous state intact.
    /// Returns the record as it was before and after the mutation.
    pub fn update<T, F>(
        &self,
        id: ReconciliationId,
        expected_version: u64,
        f: F,
    ) -> CamResult<(Reconciliation, Reconciliation, T)>
    where
        F: FnOnce(&mut Reconciliation) -> CamResult<T>,
    {
        let mut data = self.write()?;
        let current = data
            .get(&id)
            .ok_or_else(|| CamError::reconciliation_not_found(id.to_string()))?;

        if current.version != expected_version {
            return Err(CamError::VersionConflict {
                expected: expected_version,
                actual: current.version,
            });
        }

        let before = current.clone();
        let mut working = current.clone();
        let value = f(&mut working)?;
        data.insert(id, working.clone());

        Ok((before, working, value))
    }

    /// Put back a record as it was, bypassing the version check
    ///
    /// Used to undo an in-memory change whose save failed.
    pub fn restore(&self, reconciliation: Reconciliation) -> CamResult<()> {
        self.write()?.insert(reconciliation.id, reconciliation);
        Ok(())
    }

    /// Drop a record from memory
    pub fn remove(&self, id: ReconciliationId) -> CamResult<Option<Reconciliation>> {
        Ok(self.write()?.remove(&id))
    }

    pub fn count(&self) -> CamResult<usize> {
        Ok(self.read()?.len())
    }
}
