// 🔎 Similarity Scorer - Tiered concept similarity (0.0 - 1.0)
// Fixed priority chain: exact > containment > numeric > token > edit distance.
// The chain returns on the first tier that applies; tier order and the
// first-match-wins numeric pair scan are load-bearing for match outcomes.

use std::collections::HashSet;

// ============================================================================
// SCORE TIERS
// ============================================================================

const SCORE_EXACT: f64 = 1.0;
const SCORE_CONTAINMENT: f64 = 0.8;
const SCORE_NUMBER_SUFFIX: f64 = 0.7;
const SCORE_NUMBER_SUBSTRING: f64 = 0.65;

/// Longest normalized string that still goes through edit distance.
const LEVENSHTEIN_MAX_LEN: usize = 20;

// ============================================================================
// CONCEPT SIMILARITY
// ============================================================================

/// Textual similarity between two concepts, both already normalized and with
/// their embedded numbers extracted (see `normalize`).
///
/// Tiers, first hit wins:
/// 1. either side empty -> 0.0
/// 2. equal -> 1.0
/// 3. one contains the other -> 0.8
/// 4. shared or related extracted numbers -> 0.6..0.9 / 0.7 / 0.65
/// 5. shared whitespace tokens -> 0.3..0.7
/// 6. short strings: scaled edit distance -> 0.0..0.5
pub fn concept_similarity(
    a_text: &str,
    a_numbers: &[String],
    b_text: &str,
    b_numbers: &[String],
) -> f64 {
    // Tier 1: nothing to compare
    if a_text.is_empty() || b_text.is_empty() {
        return 0.0;
    }

    // Tier 2: identical normalized text
    if a_text == b_text {
        return SCORE_EXACT;
    }

    // Tier 3: substring containment either way
    if a_text.contains(b_text) || b_text.contains(a_text) {
        return SCORE_CONTAINMENT;
    }

    // Tier 4: embedded numbers (cheque/reference numbers carry most signal)
    if !a_numbers.is_empty() && !b_numbers.is_empty() {
        if let Some(score) = number_similarity(a_numbers, b_numbers) {
            return score;
        }
    }

    // Tier 5: shared tokens
    if let Some(score) = token_similarity(a_text, b_text) {
        return score;
    }

    // Tier 6: edit distance, short strings only
    let len_a = a_text.chars().count();
    let len_b = b_text.chars().count();
    if len_a < LEVENSHTEIN_MAX_LEN && len_b < LEVENSHTEIN_MAX_LEN {
        let distance = levenshtein(a_text, b_text) as f64;
        let max_len = len_a.max(len_b) as f64;
        return (1.0 - distance / max_len).max(0.0) * 0.5;
    }

    0.0
}

/// Numeric tier: exact intersection first, then a first-match-wins scan for
/// substring / suffix relations between number pairs.
fn number_similarity(a_numbers: &[String], b_numbers: &[String]) -> Option<f64> {
    // Exact matches (string equality) across both lists
    let a_set: HashSet<&str> = a_numbers.iter().map(String::as_str).collect();
    let b_set: HashSet<&str> = b_numbers.iter().map(String::as_str).collect();
    let intersection = a_set.intersection(&b_set).count();

    if intersection > 0 {
        let max_len = a_numbers.len().max(b_numbers.len()) as f64;
        return Some(0.6 + 0.3 * intersection as f64 / max_len);
    }

    // No exact match: scan pairs in list order, outer = a, inner = b.
    // The FIRST qualifying pair decides the score, not the best pair.
    for na in a_numbers {
        for nb in b_numbers {
            // Suffix relation, e.g. "1112" tailing "661112" (truncated
            // cheque numbers). Needs one side >= 4 digits and the other >= 3.
            let suffix_lengths = (na.len() >= 4 && nb.len() >= 3)
                || (nb.len() >= 4 && na.len() >= 3);
            if suffix_lengths && (na.ends_with(nb.as_str()) || nb.ends_with(na.as_str())) {
                return Some(SCORE_NUMBER_SUFFIX);
            }

            // Substring relation, both sides >= 3 digits
            if na.len() >= 3
                && nb.len() >= 3
                && (na.contains(nb.as_str()) || nb.contains(na.as_str()))
            {
                return Some(SCORE_NUMBER_SUBSTRING);
            }
        }
    }

    None
}

/// Token tier: any whitespace token shared between the two normalized strings.
fn token_similarity(a_text: &str, b_text: &str) -> Option<f64> {
    let a_tokens: Vec<&str> = a_text.split_whitespace().collect();
    let b_tokens: Vec<&str> = b_text.split_whitespace().collect();

    let b_set: HashSet<&str> = b_tokens.iter().copied().collect();
    let common: HashSet<&str> = a_tokens
        .iter()
        .copied()
        .filter(|t| b_set.contains(t))
        .collect();

    if common.is_empty() {
        return None;
    }

    let max_len = a_tokens.len().max(b_tokens.len()) as f64;
    Some(0.3 + 0.4 * common.len() as f64 / max_len)
}

// ============================================================================
// LEVENSHTEIN DISTANCE
// ============================================================================

/// Unit-cost edit distance (insert / delete / substitute), two-row DP.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr: Vec<usize> = vec![0; b_chars.len() + 1];

    for (i, ca) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let substitution_cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1)
                .min(curr[j] + 1)
                .min(prev[j] + substitution_cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{extract_numbers, normalize};

    fn similarity(a: &str, b: &str) -> f64 {
        concept_similarity(
            &normalize(a),
            &extract_numbers(a),
            &normalize(b),
            &extract_numbers(b),
        )
    }

    #[test]
    fn test_empty_sides_score_zero() {
        assert_eq!(similarity("", "Cheque 123"), 0.0);
        assert_eq!(similarity("Cheque 123", ""), 0.0);
        assert_eq!(similarity("...", "Cheque 123"), 0.0);
    }

    #[test]
    fn test_exact_normalized_match() {
        assert_eq!(similarity("PAGO NÓMINA", "pago  nómina."), 1.0);
    }

    #[test]
    fn test_containment() {
        assert_eq!(similarity("transferencia nomina enero", "nomina enero"), 0.8);
    }

    #[test]
    fn test_number_exact_intersection() {
        // One number each side, shared -> 0.6 + 0.3 * 1/1 = 0.9
        let score = similarity("Recibo 7701", "Pago recibido 7701 gracias");
        assert!((score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_number_exact_intersection_partial() {
        // Shared 1 of max(2, 1) numbers -> 0.6 + 0.3 * 0.5 = 0.75
        let score = similarity("fact 500 ref 88231", "abono 88231");
        assert!((score - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_number_suffix_beats_substring_on_same_pair() {
        // "1112" is a suffix of "661112" -> 0.7, not the 0.65 substring tier
        assert_eq!(similarity("Cheque 661112", "CHQ 1112"), 0.7);
    }

    #[test]
    fn test_number_substring_interior() {
        // "123" sits inside "51239" but is not a suffix -> 0.65
        assert_eq!(similarity("operacion 51239", "doc 123"), 0.65);
    }

    #[test]
    fn test_number_short_runs_ignored() {
        // Two-digit runs never qualify for substring/suffix; falls through
        // to the token tier, where nothing is shared, then edit distance.
        let score = similarity("pago 12", "giro 12345678901234567890");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_first_qualifying_pair_wins() {
        // Outer list order decides: 4455 vs (9999, 4455) hits the exact
        // intersection; but for the scan, "784455" vs ["123", "4455"]
        // qualifies on the second inner element with suffix 0.7
        assert_eq!(similarity("num 784455", "a 123 b 4455"), 0.7);
    }

    #[test]
    fn test_token_overlap() {
        // "luz" shared, 2 tokens each side -> 0.3 + 0.4 * 1/2 = 0.5
        let score = similarity("pago luz", "recibo luz");
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_levenshtein_tier_short_strings() {
        // "casa" vs "cama": distance 1, max len 4 -> (1 - 0.25) * 0.5 = 0.375
        let score = similarity("casa", "cama");
        assert!((score - 0.375).abs() < 1e-9);
    }

    #[test]
    fn test_long_dissimilar_strings_score_zero() {
        // Both >= 20 chars, no shared tokens or numbers
        let score = similarity(
            "abcdefghij klmnopqrst uvwxyz",
            "zyxwvu tsrqponmlk jihgfedcba",
        );
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("niño", "nino"), 1);
    }
}
