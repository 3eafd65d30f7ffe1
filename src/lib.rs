// Conciliar - Ledger/Bank Reconciliation Matcher - Core Library
// Exposes all modules for use in the CLI and tests

pub mod normalize;
pub mod similarity;
pub mod scoring;
pub mod model;
pub mod index;
pub mod engine;
pub mod overrides;
pub mod loader;
pub mod review;

// Re-export commonly used types
pub use engine::ReconciliationEngine;
pub use index::AmountIndex;
pub use loader::{load_entries, load_records, parse_amount, parse_date};
pub use model::{
    amount_cents, Conflict, ConflictReason, ExternalRecord, LedgerEntry, MatchResult,
    ReconciliationResult, ScoredCandidate,
};
pub use normalize::{extract_numbers, normalize};
pub use overrides::{BatchOutcome, ManualOverrideStore};
pub use review::ReviewService;
pub use scoring::{MatchConfig, MatchScorer};
pub use similarity::{concept_similarity, levenshtein};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
