// 👀 Review Service - Conflict resolution surface for the review UI
// Wraps the engine and the override store: resolving is a store write,
// conflict listing is a fresh engine run (determinism keeps it stable).

use crate::engine::ReconciliationEngine;
use crate::model::{Conflict, ExternalRecord, LedgerEntry, ReconciliationResult};
use crate::overrides::{BatchOutcome, ManualOverrideStore};
use crate::scoring::MatchConfig;
use anyhow::Result;

pub struct ReviewService {
    entries: Vec<LedgerEntry>,
    records: Vec<ExternalRecord>,
    engine: ReconciliationEngine,
    store: ManualOverrideStore,
}

impl ReviewService {
    pub fn new(
        entries: Vec<LedgerEntry>,
        records: Vec<ExternalRecord>,
        config: MatchConfig,
        store: ManualOverrideStore,
    ) -> Self {
        ReviewService {
            entries,
            records,
            engine: ReconciliationEngine::new(config),
            store,
        }
    }

    /// Persist one confirmed pairing.
    pub fn resolve_one(&self, entry_id: &str, record_id: &str) -> Result<()> {
        self.store.set_one(entry_id, record_id)
    }

    /// Persist a batch of confirmed pairings (serialized, bounded wait).
    pub fn resolve_batch(&self, pairs: &[(String, String)]) -> Result<BatchOutcome> {
        self.store.set_batch(pairs)
    }

    /// Current conflicts, recomputed by rerunning the engine with the
    /// persisted overrides applied.
    pub fn get_all_conflicts(&self) -> Result<Vec<Conflict>> {
        Ok(self.run()?.conflicts)
    }

    /// Full reconciliation over the held inputs.
    pub fn run(&self) -> Result<ReconciliationResult> {
        let overrides = self.store.get_all()?;
        Ok(self.engine.reconcile(&self.entries, &self.records, &overrides))
    }

    pub fn clear_overrides(&self) -> Result<()> {
        self.store.clear()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn service(dir: &TempDir) -> ReviewService {
        // Two near-identical records force a MultipleCandidates conflict
        let entries = vec![LedgerEntry::new(date(5), "1", "recibo agua", -60.0)];
        let records = vec![
            ExternalRecord::new(date(5), None, "recibo agua enero", "", -60.0),
            ExternalRecord::new(date(5), None, "recibo agua febrero", "", -60.0),
        ];

        ReviewService::new(
            entries,
            records,
            MatchConfig::default(),
            ManualOverrideStore::new(dir.path().join("overrides.json")),
        )
    }

    #[test]
    fn test_conflicts_recomputed_each_call() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let conflicts = service.get_all_conflicts().unwrap();
        assert_eq!(conflicts.len(), 1);

        // Resolving the conflict makes the next recomputation clean
        let entry_id = conflicts[0].entry.id.clone();
        let record_id = conflicts[0].candidates[0].record.id.clone();
        service.resolve_one(&entry_id, &record_id).unwrap();

        assert!(service.get_all_conflicts().unwrap().is_empty());

        let result = service.run().unwrap();
        assert_eq!(result.matched.len(), 1);
        assert!(result.matched[0].is_manual);
    }

    #[test]
    fn test_resolve_batch_then_clear() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let conflicts = service.get_all_conflicts().unwrap();
        let pairs = vec![(
            conflicts[0].entry.id.clone(),
            conflicts[0].candidates[0].record.id.clone(),
        )];

        let outcome = service.resolve_batch(&pairs).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.count, 1);
        assert!(service.get_all_conflicts().unwrap().is_empty());

        service.clear_overrides().unwrap();
        assert_eq!(service.get_all_conflicts().unwrap().len(), 1);
    }
}
