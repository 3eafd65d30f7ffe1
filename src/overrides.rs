// 🔐 Manual Override Store - Persisted entry -> record pairings
// A flat JSON map on disk. Batch writes are serialized through a mutex with
// a bounded wait; timing out is a structured failure handed back to the
// caller, never a silent block or an automatic retry.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default bounded wait for the batch-write lock.
const BATCH_LOCK_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// BATCH OUTCOME
// ============================================================================

/// Result of a batch write: either `success` with the number of pairs
/// applied, or a failure message (lock timeout). Infrastructure errors (IO,
/// malformed JSON on disk) propagate as `anyhow` errors instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub success: bool,
    pub count: usize,
    pub message: Option<String>,
}

impl BatchOutcome {
    fn applied(count: usize) -> Self {
        BatchOutcome {
            success: true,
            count,
            message: None,
        }
    }

    fn failed(message: &str) -> Self {
        BatchOutcome {
            success: false,
            count: 0,
            message: Some(message.to_string()),
        }
    }
}

// ============================================================================
// MANUAL OVERRIDE STORE
// ============================================================================

pub struct ManualOverrideStore {
    path: PathBuf,
    batch_lock: Mutex<()>,
    lock_timeout: Duration,
}

impl ManualOverrideStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ManualOverrideStore {
            path: path.as_ref().to_path_buf(),
            batch_lock: Mutex::new(()),
            lock_timeout: BATCH_LOCK_TIMEOUT,
        }
    }

    /// Mainly for tests: shrink the bounded wait.
    pub fn with_lock_timeout<P: AsRef<Path>>(path: P, timeout: Duration) -> Self {
        ManualOverrideStore {
            path: path.as_ref().to_path_buf(),
            batch_lock: Mutex::new(()),
            lock_timeout: timeout,
        }
    }

    /// Load the persisted map. A missing file is an empty map, not an error.
    pub fn get_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read override file: {:?}", self.path))?;

        serde_json::from_str(&content).context("Failed to parse override JSON")
    }

    /// Persist a single pairing, last write wins. Single-pair writes are rare
    /// enough that they skip the batch lock by contract.
    pub fn set_one(&self, entry_id: &str, record_id: &str) -> Result<()> {
        let mut map = self.get_all()?;
        map.insert(entry_id.to_string(), record_id.to_string());
        self.write_atomic(&map)
    }

    /// Merge a batch of pairings into the persisted map.
    ///
    /// Input pairs are de-duplicated by entry id keeping the LAST occurrence,
    /// then merged under an exclusive lock with a bounded wait. On timeout
    /// nothing is read or written and the caller gets a structured failure.
    pub fn set_batch(&self, pairs: &[(String, String)]) -> Result<BatchOutcome> {
        let mut deduped: HashMap<String, String> = HashMap::new();
        for (entry_id, record_id) in pairs {
            deduped.insert(entry_id.clone(), record_id.clone());
        }

        // Guard releases the lock on every exit path, `?` included
        let _guard = match self.batch_lock.try_lock_for(self.lock_timeout) {
            Some(guard) => guard,
            None => {
                return Ok(BatchOutcome::failed(
                    "Timed out waiting for the override store lock",
                ))
            }
        };

        let mut map = self.get_all()?;
        let count = deduped.len();
        map.extend(deduped);
        self.write_atomic(&map)?;

        Ok(BatchOutcome::applied(count))
    }

    /// Drop every persisted override.
    pub fn clear(&self) -> Result<()> {
        self.write_atomic(&HashMap::new())
    }

    /// Write the whole map in one atomic step: temp file next to the target,
    /// then rename over it.
    fn write_atomic(&self, map: &HashMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(map).context("Failed to serialize overrides")?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write override file: {:?}", tmp_path))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to replace override file: {:?}", self.path))?;

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ManualOverrideStore {
        ManualOverrideStore::new(dir.path().join("overrides.json"))
    }

    #[test]
    fn test_missing_file_is_empty_map() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_set_one_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set_one("ACC_1_1_-10", "BANK_1_x_-10").unwrap();
        store.set_one("ACC_1_1_-10", "BANK_2_y_-10").unwrap(); // last wins

        let map = store.get_all().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["ACC_1_1_-10"], "BANK_2_y_-10");
    }

    #[test]
    fn test_set_batch_merges_and_dedupes_keeping_last() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set_one("ACC_keep", "BANK_old").unwrap();

        let pairs = vec![
            ("ACC_a".to_string(), "BANK_1".to_string()),
            ("ACC_b".to_string(), "BANK_2".to_string()),
            ("ACC_a".to_string(), "BANK_3".to_string()), // duplicate, last wins
        ];

        let outcome = store.set_batch(&pairs).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.count, 2);

        let map = store.get_all().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["ACC_a"], "BANK_3");
        assert_eq!(map["ACC_b"], "BANK_2");
        assert_eq!(map["ACC_keep"], "BANK_old"); // untouched existing pair
    }

    #[test]
    fn test_set_batch_lock_timeout_is_structured_failure() {
        let dir = TempDir::new().unwrap();
        let store = ManualOverrideStore::with_lock_timeout(
            dir.path().join("overrides.json"),
            Duration::from_millis(20),
        );

        // Hold the batch lock so set_batch cannot acquire it
        let _held = store.batch_lock.lock();

        let pairs = vec![("ACC_a".to_string(), "BANK_1".to_string())];
        let outcome = store.set_batch(&pairs).unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.count, 0);
        assert!(outcome.message.is_some());
        // Nothing was written
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_clear_empties_persisted_map() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set_one("ACC_a", "BANK_1").unwrap();
        store.clear().unwrap();

        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set_one("ACC_a", "BANK_1").unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
