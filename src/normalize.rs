// 🧹 Concept Normalizer - Canonical text + embedded number extraction
// Normalization happens once at load time; everything downstream
// (similarity, tokens) works on the cached result.

// ============================================================================
// TEXT NORMALIZATION
// ============================================================================

/// Canonicalize a free-text concept for comparison.
///
/// Lowercase, every character that is not a letter/digit/underscore/whitespace
/// becomes a space, whitespace runs collapse to a single space, trimmed.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let replaced: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<&str>>().join(" ")
}

// ============================================================================
// NUMBER EXTRACTION
// ============================================================================

/// Extract all maximal digit runs from the ORIGINAL (non-normalized) text,
/// in order of appearance, with leading zeros stripped.
///
/// A run that is all zeros becomes an empty string; the list length is
/// preserved so positions still pair up.
pub fn extract_numbers(text: &str) -> Vec<String> {
    let mut numbers = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if !current.is_empty() {
            numbers.push(strip_leading_zeros(&current));
            current.clear();
        }
    }

    if !current.is_empty() {
        numbers.push(strip_leading_zeros(&current));
    }

    numbers
}

fn strip_leading_zeros(run: &str) -> String {
    run.trim_start_matches('0').to_string()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercase_and_punctuation() {
        assert_eq!(normalize("TRANSF. S.A. (Nómina)"), "transf s a nómina");
        assert_eq!(normalize("PAGO-LUZ/AGUA"), "pago luz agua");
    }

    #[test]
    fn test_normalize_keeps_underscores() {
        assert_eq!(normalize("REF_2024 pago"), "ref_2024 pago");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  CHEQUE    661112  "), "cheque 661112");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("---///"), "");
    }

    #[test]
    fn test_extract_numbers_basic() {
        assert_eq!(extract_numbers("Cheque 661112"), vec!["661112"]);
        assert_eq!(
            extract_numbers("Recibo 042 ref 7701"),
            vec!["42", "7701"]
        );
    }

    #[test]
    fn test_extract_numbers_all_zeros_keeps_slot() {
        // Run of zeros strips to empty but the list length is preserved
        assert_eq!(extract_numbers("ref 000 y 15"), vec!["", "15"]);
    }

    #[test]
    fn test_extract_numbers_runs_on_original_text() {
        // Digits split by punctuation are separate runs
        assert_eq!(extract_numbers("12.34"), vec!["12", "34"]);
    }

    #[test]
    fn test_extract_numbers_none() {
        assert!(extract_numbers("sin referencia").is_empty());
    }
}
