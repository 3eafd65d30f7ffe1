// 📒 Data Model - Ledger entries, bank records, match results
// Identities are pure functions of the source row (date epoch + discriminator
// + amount), so reloading the same rows reproduces the same IDs and persisted
// overrides keep resolving across sessions.

use crate::normalize::{extract_numbers, normalize};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// ============================================================================
// AMOUNT BUCKETING
// ============================================================================

/// Amount rounded to 2 decimal places, expressed in cents.
///
/// This is the mandatory exact-match key: no fuzzy matching ever crosses
/// amount buckets.
pub fn amount_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Render an amount the way the identity scheme expects: as its plain
/// numeric value (`-150`, `-150.5`), never a fixed-format string.
fn amount_token(amount: f64) -> String {
    format!("{}", amount)
}

fn epoch_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

// ============================================================================
// LEDGER ENTRY
// ============================================================================

/// One internal accounting entry to be reconciled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Stable derived identity: ACC_{epochMillis}_{entryNumber}_{amount}
    pub id: String,
    pub date: NaiveDate,
    /// Secondary discriminator, used for identity and display sort only
    pub entry_number: String,
    pub concept: String,
    pub amount: f64,

    /// Cached at load time
    pub normalized_concept: String,
    /// Digit runs from the original concept, leading zeros stripped
    pub numbers: Vec<String>,
}

impl LedgerEntry {
    pub fn new(date: NaiveDate, entry_number: &str, concept: &str, amount: f64) -> Self {
        let id = format!(
            "ACC_{}_{}_{}",
            epoch_millis(date),
            entry_number,
            amount_token(amount)
        );

        LedgerEntry {
            id,
            date,
            entry_number: entry_number.to_string(),
            concept: concept.to_string(),
            amount,
            normalized_concept: normalize(concept),
            numbers: extract_numbers(concept),
        }
    }

    pub fn amount_cents(&self) -> i64 {
        amount_cents(self.amount)
    }
}

// ============================================================================
// EXTERNAL RECORD
// ============================================================================

/// One transaction line from the counterpart system (a bank statement line).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalRecord {
    /// Stable derived identity: BANK_{epochMillis}_{concept prefix}_{amount}
    pub id: String,
    pub date: NaiveDate,
    pub value_date: Option<NaiveDate>,
    pub concept: String,
    /// Secondary descriptive text, folded into the normalized concept
    pub additional: String,
    pub amount: f64,

    /// normalize(concept + " " + additional), cached at load time
    pub normalized_concept: String,
    pub numbers: Vec<String>,
}

impl ExternalRecord {
    pub fn new(
        date: NaiveDate,
        value_date: Option<NaiveDate>,
        concept: &str,
        additional: &str,
        amount: f64,
    ) -> Self {
        let id = format!(
            "BANK_{}_{}_{}",
            epoch_millis(date),
            concept_discriminator(concept),
            amount_token(amount)
        );

        let combined = format!("{} {}", concept, additional);

        ExternalRecord {
            id,
            date,
            value_date,
            concept: concept.to_string(),
            additional: additional.to_string(),
            amount,
            normalized_concept: normalize(&combined),
            numbers: extract_numbers(&combined),
        }
    }

    pub fn amount_cents(&self) -> i64 {
        amount_cents(self.amount)
    }
}

/// First 20 alphanumeric characters of the concept, original casing.
fn concept_discriminator(concept: &str) -> String {
    concept
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(20)
        .collect()
}

// ============================================================================
// MATCH OUTCOMES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub entry: LedgerEntry,
    pub record: ExternalRecord,
    pub score: f64,
    /// True when committed through a manual override rather than scoring
    pub is_manual: bool,
}

/// A scored candidate attached to a conflict for human review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub record: ExternalRecord,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictReason {
    /// Best candidate did not clear the auto-match threshold
    LowConfidence,
    /// Best candidate cleared the threshold but had no clear margin
    MultipleCandidates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub entry: LedgerEntry,
    /// Top candidates by descending score, capped at 5
    pub candidates: Vec<ScoredCandidate>,
    pub reason: ConflictReason,
}

// ============================================================================
// RECONCILIATION RESULT
// ============================================================================

/// Final partition of a run. Every input entry lands in exactly one of
/// matched / conflicts / unmatched_entries; unmatched_records are the
/// records no match ever consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub matched: Vec<MatchResult>,
    pub conflicts: Vec<Conflict>,
    pub unmatched_entries: Vec<LedgerEntry>,
    pub unmatched_records: Vec<ExternalRecord>,
}

impl ReconciliationResult {
    pub fn entry_count(&self) -> usize {
        self.matched.len() + self.conflicts.len() + self.unmatched_entries.len()
    }

    /// Fraction of entries auto- or manually matched (0.0 when empty).
    pub fn match_rate(&self) -> f64 {
        let total = self.entry_count();
        if total == 0 {
            return 0.0;
        }
        self.matched.len() as f64 / total as f64
    }

    pub fn summary(&self) -> String {
        format!(
            "{} matched ({:.1}%), {} conflicts, {} unmatched entries, {} unmatched records",
            self.matched.len(),
            self.match_rate() * 100.0,
            self.conflicts.len(),
            self.unmatched_entries.len(),
            self.unmatched_records.len()
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
