// 📂 Loaders - CSV -> entries / records
// Rows missing a date or an amount are filtered out silently; the amount
// parser itself never fails and resolves garbage to 0.0 (its contract).

use crate::model::{ExternalRecord, LedgerEntry};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

// ============================================================================
// FIELD PARSERS
// ============================================================================

/// Parse a locale-ish money string to a decimal amount.
///
/// Accepts currency symbols, thousands separators and comma decimals
/// ("-1.234,56", "€ 1,234.56", "-150"). Unparseable input resolves to 0.0,
/// never an error: that quirk is the parser's published contract and
/// downstream code relies on it.
pub fn parse_amount(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | ','))
        .collect();

    if cleaned.is_empty() {
        return 0.0;
    }

    let has_dot = cleaned.contains('.');
    let has_comma = cleaned.contains(',');

    let canonical = if has_dot && has_comma {
        // Whichever separator appears last is the decimal one
        let dot_pos = cleaned.rfind('.').unwrap_or(0);
        let comma_pos = cleaned.rfind(',').unwrap_or(0);
        if comma_pos > dot_pos {
            cleaned.replace('.', "").replace(',', ".")
        } else {
            cleaned.replace(',', "")
        }
    } else if has_comma {
        cleaned.replace(',', ".")
    } else {
        cleaned
    };

    canonical.parse::<f64>().unwrap_or(0.0)
}

/// Parse a date in ISO or day-first form. None filters the row out upstream.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y") {
        return Some(date);
    }

    None
}

// ============================================================================
// CSV LOADING
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawEntryRow {
    date: Option<String>,
    #[serde(alias = "number", alias = "entryNumber")]
    entry_number: Option<String>,
    concept: Option<String>,
    amount: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRecordRow {
    date: Option<String>,
    #[serde(default, alias = "valueDate")]
    value_date: Option<String>,
    concept: Option<String>,
    #[serde(default)]
    additional: Option<String>,
    amount: Option<String>,
}

/// Load ledger entries from CSV in file order, skipping malformed rows.
pub fn load_entries<P: AsRef<Path>>(path: P) -> Result<Vec<LedgerEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())
        .with_context(|| format!("Failed to open entries CSV: {:?}", path.as_ref()))?;

    let mut entries = Vec::new();

    for row in reader.deserialize() {
        let raw: RawEntryRow = match row {
            Ok(raw) => raw,
            Err(_) => continue, // malformed row, skip silently
        };

        let date = match raw.date.as_deref().and_then(parse_date) {
            Some(d) => d,
            None => continue,
        };
        let amount_text = match raw.amount.as_deref() {
            Some(a) if !a.is_empty() => a,
            _ => continue,
        };

        entries.push(LedgerEntry::new(
            date,
            raw.entry_number.as_deref().unwrap_or(""),
            raw.concept.as_deref().unwrap_or(""),
            parse_amount(amount_text),
        ));
    }

    Ok(entries)
}

/// Load external (bank) records from CSV in file order, skipping malformed rows.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<ExternalRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())
        .with_context(|| format!("Failed to open records CSV: {:?}", path.as_ref()))?;

    let mut records = Vec::new();

    for row in reader.deserialize() {
        let raw: RawRecordRow = match row {
            Ok(raw) => raw,
            Err(_) => continue,
        };

        let date = match raw.date.as_deref().and_then(parse_date) {
            Some(d) => d,
            None => continue,
        };
        let amount_text = match raw.amount.as_deref() {
            Some(a) if !a.is_empty() => a,
            _ => continue,
        };

        records.push(ExternalRecord::new(
            date,
            raw.value_date.as_deref().and_then(parse_date),
            raw.concept.as_deref().unwrap_or(""),
            raw.additional.as_deref().unwrap_or(""),
            parse_amount(amount_text),
        ));
    }

    Ok(records)
}

// ============================================================================
// TESTS
// ============================================================================
