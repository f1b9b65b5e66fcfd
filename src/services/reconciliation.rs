//! Reconciliation service
//!
//! Storage-backed lifecycle for reconciliations: create a draft, calculate
//! it (any number of times), finalize it. Each transition is persisted and
//! written to the audit log.

use rust_decimal::Decimal;

use super::aggregator;
use super::allocation::{CalculationInput, CalculationOutcome};
use crate::audit::{reconciliation_diff, AuditEntry, EntityType, Operation};
use crate::error::{CamError, CamResult};
use crate::models::{AllocationMethod, Period, PropertyId, Reconciliation, ReconciliationId};
use crate::storage::Storage;

/// Service for reconciliation lifecycle operations
pub struct ReconciliationService<'a> {
    storage: &'a Storage,
}

impl<'a> ReconciliationService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create and persist a new draft
    pub fn create_draft(
        &self,
        property_id: PropertyId,
        period: Period,
        allocation_method: AllocationMethod,
        building_total_sf: Decimal,
    ) -> CamResult<Reconciliation> {
        period.validate()?;
        if building_total_sf <= Decimal::ZERO {
            return Err(CamError::InvalidInput(format!(
                "building_total_sf must be positive, got {}",
                building_total_sf
            )));
        }

        let rec =
            Reconciliation::new_draft(property_id, period, allocation_method, building_total_sf);

        self.storage.reconciliations.insert(rec.clone())?;
        if let Err(err) = self.storage.reconciliations.save() {
            self.storage.reconciliations.remove(rec.id)?;
            return Err(err);
        }

        self.storage.log_create(
            EntityType::Reconciliation,
            audit_id(rec.id),
            Some(label(&rec)),
            rec.version,
            &rec,
        )?;

        log::info!("Created draft reconciliation {} for {}", rec.id, rec.period);
        Ok(rec)
    }

    /// Calculate a draft, replacing its items
    ///
    /// `expected_version` must match the stored version; a concurrent
    /// calculate or finalize makes this fail with `VersionConflict`.
    pub fn calculate(
        &self,
        id: ReconciliationId,
        expected_version: u64,
        input: &CalculationInput,
    ) -> CamResult<(Reconciliation, CalculationOutcome)> {
        let (before, after, outcome) = self
            .storage
            .reconciliations
            .update(id, expected_version, |rec| aggregator::calculate(rec, input))?;
        self.persist(&before)?;

        self.storage.log_transition(
            Operation::Calculate,
            EntityType::Reconciliation,
            audit_id(id),
            Some(label(&after)),
            after.version,
            &before,
            &after,
            reconciliation_diff(&before, &after),
        )?;

        Ok((after, outcome))
    }

    /// Finalize a draft; it can never be recalculated afterwards
    pub fn finalize(
        &self,
        id: ReconciliationId,
        expected_version: u64,
    ) -> CamResult<Reconciliation> {
        let (before, after, ()) = self
            .storage
            .reconciliations
            .update(id, expected_version, aggregator::finalize)?;
        self.persist(&before)?;

        self.storage.log_transition(
            Operation::Finalize,
            EntityType::Reconciliation,
            audit_id(id),
            Some(label(&after)),
            after.version,
            &before,
            &after,
            reconciliation_diff(&before, &after),
        )?;

        log::info!(
            "Finalized reconciliation {} with {} allocations totalling {}",
            id,
            after.items.len(),
            after.total_allocated()
        );
        Ok(after)
    }

    /// Save after an update; on failure the in-memory record goes back to `before`
    fn persist(&self, before: &Reconciliation) -> CamResult<()> {
        if let Err(err) = self.storage.reconciliations.save() {
            log::error!("Failed to save reconciliation {}: {}", before.id, err);
            self.storage.reconciliations.restore(before.clone())?;
            return Err(err);
        }
        Ok(())
    }

    /// Get a reconciliation by ID
    pub fn get(&self, id: ReconciliationId) -> CamResult<Reconciliation> {
        self.storage
            .reconciliations
            .get(id)?
            .ok_or_else(|| CamError::reconciliation_not_found(id.to_string()))
    }

    /// Find a reconciliation by full ID or by a unique prefix of it
    pub fn find(&self, identifier: &str) -> CamResult<Reconciliation> {
        if let Ok(id) = identifier.parse::<ReconciliationId>() {
            return self.get(id);
        }

        let needle = identifier.trim_start_matches("rec-").to_lowercase();
        let matches: Vec<_> = self
            .list()?
            .into_iter()
            .filter(|r| !needle.is_empty() && r.id.as_uuid().to_string().starts_with(&needle))
            .collect();

        if matches.len() > 1 {
            return Err(CamError::InvalidInput(format!(
                "'{}' matches {} reconciliations",
                identifier,
                matches.len()
            )));
        }
        matches
            .into_iter()
            .next()
            .ok_or_else(|| CamError::reconciliation_not_found(identifier))
    }

    /// All reconciliations, newest first
    pub fn list(&self) -> CamResult<Vec<Reconciliation>> {
        self.storage.reconciliations.get_all()
    }

    /// All reconciliations for one property, newest first
    pub fn list_for_property(&self, property_id: PropertyId) -> CamResult<Vec<Reconciliation>> {
        self.storage.reconciliations.get_by_property(property_id)
    }

    /// Audit history of one reconciliation, oldest first
    pub fn history(&self, id: ReconciliationId) -> CamResult<Vec<AuditEntry>> {
        self.storage.audit().history(&audit_id(id))
    }
}

fn audit_id(id: ReconciliationId) -> String {
    id.as_uuid().to_string()
}

fn label(rec: &Reconciliation) -> String {
    format!("{} {}", rec.property_id, rec.period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CamPaths;
    use crate::models::{ExpenseCategory, ExpenseItem, LeaseTerms, Money, TenantId};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CamPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        (temp_dir, storage)
    }

    fn period() -> Period {
        Period::annual(2025).unwrap()
    }

    fn input() -> CalculationInput {
        CalculationInput::new(
            vec![ExpenseItem::new(
                ExpenseCategory::Landscaping,
                Money::from_dollars(12000),
                period(),
            )],
            vec![
                LeaseTerms::new(TenantId::new(), dec!(6000)).with_name("North"),
                LeaseTerms::new(TenantId::new(), dec!(4000)).with_name("South"),
            ],
            dec!(10000),
        )
    }

    fn create_draft(service: &ReconciliationService) -> Reconciliation {
        service
            .create_draft(
                PropertyId::new(),
                period(),
                AllocationMethod::ProRataSf,
                dec!(10000),
            )
            .unwrap()
    }

    #[test]
    fn test_full_lifecycle() {
        let (_temp, storage) = create_test_storage();
        let service = ReconciliationService::new(&storage);

        let draft = create_draft(&service);
        let (calculated, outcome) = service.calculate(draft.id, 0, &input()).unwrap();
        assert_eq!(calculated.version, 1);
        assert_eq!(outcome.items.len(), 2);
        assert_eq!(calculated.total_allocated(), Money::from_dollars(12000));

        let finalized = service.finalize(draft.id, 1).unwrap();
        assert!(finalized.is_finalized);
        assert_eq!(service.get(draft.id).unwrap(), finalized);

        let ops: Vec<_> = service
            .history(draft.id)
            .unwrap()
            .into_iter()
            .map(|e| e.operation)
            .collect();
        assert_eq!(
            ops,
            vec![Operation::Create, Operation::Calculate, Operation::Finalize]
        );
    }

    #[test]
    fn test_failed_save_rolls_back() {
        let (_temp, storage) = create_test_storage();
        let service = ReconciliationService::new(&storage);
        let draft = create_draft(&service);

        // a directory where the data file belongs makes the rename fail
        let file = storage.paths().reconciliations_file();
        std::fs::remove_file(&file).unwrap();
        std::fs::create_dir(&file).unwrap();

        let result = service.calculate(draft.id, 0, &input());
        assert!(matches!(result, Err(CamError::Storage(_))));
        assert_eq!(service.get(draft.id).unwrap(), draft);

        std::fs::remove_dir(&file).unwrap();
        let (calculated, _) = service.calculate(draft.id, 0, &input()).unwrap();
        assert_eq!(calculated.version, 1);
    }

    #[test]
    fn test_calculate_after_finalize_rejected() {
        let (_temp, storage) = create_test_storage();
        let service = ReconciliationService::new(&storage);

        let draft = create_draft(&service);
        service.calculate(draft.id, 0, &input()).unwrap();
        let finalized = service.finalize(draft.id, 1).unwrap();

        let result = service.calculate(draft.id, finalized.version, &input());
        assert!(result.unwrap_err().is_not_draft());
        assert_eq!(service.get(draft.id).unwrap(), finalized);
    }

    #[test]
    fn test_stale_version_rejected() {
        let (_temp, storage) = create_test_storage();
        let service = ReconciliationService::new(&storage);

        let draft = create_draft(&service);
        service.calculate(draft.id, 0, &input()).unwrap();

        let result = service.finalize(draft.id, 0);
        assert!(matches!(
            result,
            Err(CamError::VersionConflict {
                expected: 0,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_finalize_empty_draft_rejected() {
        let (_temp, storage) = create_test_storage();
        let service = ReconciliationService::new(&storage);

        let draft = create_draft(&service);
        assert!(matches!(
            service.finalize(draft.id, 0),
            Err(CamError::EmptyAllocation(_))
        ));
        assert!(service.get(draft.id).unwrap().is_draft());
    }

    #[test]
    fn test_persisted_across_storage_instances() {
        let (temp, storage) = create_test_storage();
        let service = ReconciliationService::new(&storage);
        let draft = create_draft(&service);
        service.calculate(draft.id, 0, &input()).unwrap();

        let reopened =
            Storage::new(CamPaths::with_base_dir(temp.path().to_path_buf())).unwrap();
        reopened.load_all().unwrap();
        let loaded = ReconciliationService::new(&reopened).get(draft.id).unwrap();
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(loaded.version, 1);
    }

    #[test]
    fn test_find_by_prefix() {
        let (_temp, storage) = create_test_storage();
        let service = ReconciliationService::new(&storage);
        let draft = create_draft(&service);

        let prefix = &draft.id.as_uuid().to_string()[..8];
        assert_eq!(service.find(prefix).unwrap().id, draft.id);
        assert!(service.find("zzzz").unwrap_err().is_not_found());
    }

    #[test]
    fn test_create_draft_validates_building() {
        let (_temp, storage) = create_test_storage();
        let service = ReconciliationService::new(&storage);

        let result = service.create_draft(
            PropertyId::new(),
            period(),
            AllocationMethod::EqualShare,
            Decimal::ZERO,
        );
        assert!(matches!(result, Err(CamError::InvalidInput(_))));
    }
}
