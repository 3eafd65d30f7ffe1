// 🗂️ Amount Index - Candidate lookup by rounded amount
// Built once per run. Equal rounded amount is the mandatory precondition for
// any non-manual pairing, so bucket membership alone defines candidacy.

use crate::model::ExternalRecord;
use std::collections::HashMap;

/// Records grouped by their rounded amount in cents.
///
/// Buckets hold indices into the record slice the index was built from, in
/// input order. Availability is the engine's concern: lookups return the raw
/// bucket and the engine filters through its available-record pool.
pub struct AmountIndex {
    buckets: HashMap<i64, Vec<usize>>,
}

impl AmountIndex {
    /// Group every record by amount in one pass.
    pub fn build(records: &[ExternalRecord]) -> Self {
        let mut buckets: HashMap<i64, Vec<usize>> = HashMap::new();

        for (idx, record) in records.iter().enumerate() {
            buckets.entry(record.amount_cents()).or_default().push(idx);
        }

        AmountIndex { buckets }
    }

    /// All record indices sharing this amount, input order, consumed or not.
    pub fn candidates(&self, cents: i64) -> &[usize] {
        self.buckets.get(&cents).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

// ============================================================================
// TESTS
// ============================================================================
