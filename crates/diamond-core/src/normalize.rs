//! Field normalisation for raw source cells.
//!
//! Every cell passes through [`clean`] first: whitespace is trimmed and
//! sentinel markers ("N/A", "-", empty, ...) become `None`. Derived numeric
//! attributes that fail to parse are dropped with a
//! [`RecordIssue::MalformedValue`], the rest of the record is kept.

use crate::error::RecordIssue;

/// Separator of the assistant-coach list in the coaches source.
pub const ASSISTANT_DELIMITER: char = ',';

const SENTINELS: &[&str] = &["n/a", "na", "n.a.", "-", "--", "none", "null", "nan"];

/// Whether a trimmed cell is a "not applicable" marker.
pub fn is_sentinel(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || SENTINELS.iter().any(|s| v.eq_ignore_ascii_case(s))
}

/// Trim a raw cell and map sentinel markers to `None`.
pub fn clean(raw: Option<&str>) -> Option<String> {
    let v = raw?.trim();
    if is_sentinel(v) {
        None
    } else {
        Some(v.to_string())
    }
}

/// Parse a height of the form `F'I"` into total inches.
///
/// Accepts `6'2"`, `6' 2"`, `6'2`, `6'2''`, `6-2` and `6'`. Inches must be
/// below 12.
pub fn parse_height(raw: &str) -> Option<i64> {
    let s = raw.trim().trim_end_matches('"').trim_end_matches("''");
    let (feet, inches) = s.split_once('\'').or_else(|| s.split_once('-'))?;

    let feet: i64 = feet.trim().parse().ok()?;
    let inches = inches.trim();
    let inches: i64 = if inches.is_empty() {
        0
    } else {
        inches.parse().ok()?
    };

    if feet <= 0 || !(0..12).contains(&inches) {
        return None;
    }
    feet.checked_mul(12)?.checked_add(inches)
}

/// Parse a weight with an optional pound suffix (`215`, `215 lb`, `215lbs`).
pub fn parse_weight(raw: &str) -> Option<i64> {
    let s = raw.trim().trim_end_matches('.').to_ascii_lowercase();
    let number = ["pounds", "lbs", "lb"]
        .iter()
        .find_map(|suffix| s.strip_suffix(suffix))
        .unwrap_or(s.as_str())
        .trim();

    let weight = parse_int(number)?;
    (weight > 0).then_some(weight)
}

/// Parse an integer, tolerating a float rendering with no fraction (`1932.0`).
pub fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    let f: f64 = s.parse().ok()?;
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

/// Clean a cell and run a parser over it.
///
/// Absent or sentinel cells yield `None` silently; a present value that the
/// parser rejects yields `None` and records a `MalformedValue` issue.
pub fn derive_attr<T>(
    field: &'static str,
    raw: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
    issues: &mut Vec<RecordIssue>,
) -> Option<T> {
    let value = clean(raw)?;
    match parse(&value) {
        Some(parsed) => Some(parsed),
        None => {
            issues.push(RecordIssue::MalformedValue { field, value });
            None
        }
    }
}

/// Split the assistant-coach list into distinct, trimmed names.
///
/// Empty entries and sentinel markers are dropped; order of first appearance
/// is kept.
pub fn split_assistants(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let mut names: Vec<String> = Vec::new();
    for part in raw.split(ASSISTANT_DELIMITER) {
        if let Some(name) = clean(Some(part)) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}
