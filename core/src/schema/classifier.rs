//! Per-value type classification
//!
//! Maps a single raw value to the column type it suggests. Numeric checks run
//! before date checks so that integer-looking strings are never read as REAL
//! and numeric-looking dates are never read as numbers.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ColumnType, RawValue};

static INTEGER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+$").expect("valid integer pattern"));

static REAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("valid real pattern"));

/// `YYYY-MM-DD HH[:MM[:SS[.fff]]]`
static SPACED_DATETIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-[01]\d-[0-3]\d\s[0-2]\d(:[0-5]\d(:[0-5]\d(\.\d+)?)?)?$")
        .expect("valid datetime pattern")
});

/// ISO-8601 date-time with an offset or `Z`
static ISO_DATETIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-[01]\d-[0-3]\dT[0-2]\d:[0-5]\d(:[0-5]\d(\.\d+)?)?([+-][0-2]\d:[0-5]\d|Z)$")
        .expect("valid iso datetime pattern")
});

/// `Y/M/D`, `M/D/YY` or `Y-M-D`, with a two- or four-digit dash year
static SHORT_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,4}/\d{1,2}/\d{1,2}|(\d{2}|\d{4})-\d{1,2}-\d{1,2})$").expect("valid date pattern")
});

/// Classify one value. `None` means the value carries no type information.
pub fn classify(value: &RawValue) -> Option<ColumnType> {
    match value {
        RawValue::Null => None,
        RawValue::Bool(_) => Some(ColumnType::Integer),
        RawValue::Integer(_) => Some(ColumnType::Integer),
        RawValue::Float(f) => Some(classify_float(*f)),
        RawValue::Text(s) if s.is_empty() => Some(ColumnType::EmptyText),
        RawValue::Text(s) => Some(classify_text(s)),
    }
}

fn classify_float(f: f64) -> ColumnType {
    if !f.is_finite() {
        ColumnType::Text
    } else if f.fract() == 0.0 {
        ColumnType::Integer
    } else {
        ColumnType::Real
    }
}

fn classify_text(s: &str) -> ColumnType {
    // Thousands separators are ignored by the numeric checks
    let numeric = s.replace(',', "");
    let numeric = numeric.trim();

    if INTEGER_PATTERN.is_match(numeric) {
        return ColumnType::Integer;
    }
    if REAL_PATTERN.is_match(numeric) {
        return ColumnType::Real;
    }
    if is_datetime(s.trim()) {
        return ColumnType::DateTime;
    }
    ColumnType::Text
}

/// Whether a trimmed string looks like a date or date-time
pub fn is_datetime(s: &str) -> bool {
    SHORT_DATE_PATTERN.is_match(s)
        || SPACED_DATETIME_PATTERN.is_match(s)
        || ISO_DATETIME_PATTERN.is_match(s)
}
