// 📅 Match Scorer - Date proximity + concept similarity, one weighted score
// score = date_component + 0.7 * concept_similarity

use crate::model::{ExternalRecord, LedgerEntry};
use crate::similarity::concept_similarity;
use serde::{Deserialize, Serialize};

// ============================================================================
// MATCH CONFIGURATION
// ============================================================================

/// Per-run matching parameters. Passed explicitly into every engine
/// invocation; there is no shared mutable configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Width of the date-score window in whole days (0..=10)
    pub date_tolerance_days: i64,

    /// Auto-match threshold: best score must be strictly above this (0..=1)
    pub min_similarity_score: f64,
}

impl MatchConfig {
    pub const DEFAULT_DATE_TOLERANCE_DAYS: i64 = 3;
    pub const DEFAULT_MIN_SIMILARITY_SCORE: f64 = 0.3;

    /// Build a config, clamping both parameters into their valid ranges.
    pub fn new(date_tolerance_days: i64, min_similarity_score: f64) -> Self {
        MatchConfig {
            date_tolerance_days: date_tolerance_days.clamp(0, 10),
            min_similarity_score: min_similarity_score.clamp(0.0, 1.0),
        }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            date_tolerance_days: Self::DEFAULT_DATE_TOLERANCE_DAYS,
            min_similarity_score: Self::DEFAULT_MIN_SIMILARITY_SCORE,
        }
    }
}

// ============================================================================
// MATCH SCORER
// ============================================================================

pub struct MatchScorer {
    pub config: MatchConfig,
}

impl MatchScorer {
    pub fn new(config: MatchConfig) -> Self {
        MatchScorer { config }
    }

    /// Combined score for an entry/candidate pair.
    ///
    /// Amount equality is a precondition handled by the amount index, so the
    /// score only weighs date proximity (max 0.3) and concept similarity
    /// (max 0.7).
    pub fn score(&self, entry: &LedgerEntry, record: &ExternalRecord) -> f64 {
        let diff_days = (entry.date - record.date).num_days().abs();
        let date_score = self.date_component(diff_days);

        let concept_score = concept_similarity(
            &entry.normalized_concept,
            &entry.numbers,
            &record.normalized_concept,
            &record.numbers,
        );

        date_score + 0.7 * concept_score
    }

    /// Date proximity component.
    ///
    /// Same day scores the full 0.3; otherwise decays linearly over TWICE the
    /// tolerance, so diff == tolerance still scores 0.15. That halfway floor
    /// at the window edge is contractual: existing persisted reconciliations
    /// depend on it, do not change the denominator.
    pub fn date_component(&self, diff_days: i64) -> f64 {
        let tolerance = self.config.date_tolerance_days;

        if diff_days == 0 {
            0.3
        } else if diff_days <= tolerance {
            0.3 * (1.0 - diff_days as f64 / (2.0 * tolerance as f64))
        } else {
            0.0
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
