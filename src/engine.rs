// ⚖️ Reconciliation Engine - Entry-by-entry matching state machine
// Per entry: OverrideCheck -> (ManualMatched | AutoMatchCheck)
//                          -> (AutoMatched | Conflicted | Unmatched)
//
// Entries are processed in input order; that order is observable because each
// committed match removes its record from every later entry's candidate set.

use crate::index::AmountIndex;
use crate::model::{
    Conflict, ConflictReason, ExternalRecord, LedgerEntry, MatchResult, ReconciliationResult,
    ScoredCandidate,
};
use crate::scoring::{MatchConfig, MatchScorer};
use std::collections::{HashMap, HashSet};

/// Minimum lead over the runner-up for an unambiguous auto-match.
const CLEAR_WINNER_MARGIN: f64 = 0.2;

/// Candidates attached to a conflict for review.
const CONFLICT_CANDIDATE_CAP: usize = 5;

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

pub struct ReconciliationEngine {
    scorer: MatchScorer,
}

impl ReconciliationEngine {
    pub fn new(config: MatchConfig) -> Self {
        ReconciliationEngine {
            scorer: MatchScorer::new(config),
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.scorer.config
    }

    /// Run one full reconciliation pass.
    ///
    /// Synchronous and all-or-nothing: consumption state lives in a pool
    /// local to this call and is discarded with it. Nothing durable is
    /// written here, overrides are input only.
    pub fn reconcile(
        &self,
        entries: &[LedgerEntry],
        records: &[ExternalRecord],
        overrides: &HashMap<String, String>,
    ) -> ReconciliationResult {
        let index = AmountIndex::build(records);
        let record_by_id: HashMap<&str, usize> = records
            .iter()
            .enumerate()
            .map(|(idx, r)| (r.id.as_str(), idx))
            .collect();

        // Pool of still-available records; removal on match is what makes a
        // record invisible to every later entry.
        let mut available: HashSet<usize> = (0..records.len()).collect();

        let mut matched = Vec::new();
        let mut conflicts = Vec::new();
        let mut unmatched_entries = Vec::new();

        for entry in entries {
            // --- OverrideCheck ---------------------------------------------
            if let Some(record_id) = overrides.get(&entry.id) {
                if let Some(&idx) = record_by_id.get(record_id.as_str()) {
                    if available.remove(&idx) {
                        matched.push(MatchResult {
                            entry: entry.clone(),
                            record: records[idx].clone(),
                            score: 1.0,
                            is_manual: true,
                        });
                        continue;
                    }
                }
                // Target missing or already consumed: fall through to
                // automatic matching, by contract not an error.
            }

            // --- Candidate retrieval ---------------------------------------
            let mut candidates: Vec<(usize, f64)> = index
                .candidates(entry.amount_cents())
                .iter()
                .copied()
                .filter(|idx| available.contains(idx))
                .map(|idx| (idx, self.scorer.score(entry, &records[idx])))
                .collect();

            if candidates.is_empty() {
                unmatched_entries.push(entry.clone());
                continue;
            }

            // Stable sort: ties keep bucket discovery order
            candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

            // --- Decision --------------------------------------------------
            let best_score = candidates[0].1;
            let second_score = candidates.get(1).map(|c| c.1).unwrap_or(0.0);
            let above_threshold = best_score > self.scorer.config.min_similarity_score;
            let clear_winner =
                candidates.len() == 1 || best_score - second_score > CLEAR_WINNER_MARGIN;

            if above_threshold && clear_winner {
                let (idx, score) = candidates[0];
                available.remove(&idx);
                matched.push(MatchResult {
                    entry: entry.clone(),
                    record: records[idx].clone(),
                    score,
                    is_manual: false,
                });
            } else {
                let reason = if !above_threshold {
                    ConflictReason::LowConfidence
                } else {
                    ConflictReason::MultipleCandidates
                };

                conflicts.push(Conflict {
                    entry: entry.clone(),
                    candidates: candidates
                        .into_iter()
                        .take(CONFLICT_CANDIDATE_CAP)
                        .map(|(idx, score)| ScoredCandidate {
                            record: records[idx].clone(),
                            score,
                        })
                        .collect(),
                    reason,
                });
            }
        }

        let unmatched_records = records
            .iter()
            .enumerate()
            .filter(|(idx, _)| available.contains(idx))
            .map(|(_, r)| r.clone())
            .collect();

        ReconciliationResult {
            matched,
            conflicts,
            unmatched_entries,
            unmatched_records,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
