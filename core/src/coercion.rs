//! Value coercion
//!
//! Converts raw cell values into the literal the engine stores for the
//! resolved column type: numbers with locale-ambiguous separators become
//! plain numbers, dates become ISO-8601 UTC timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rusqlite::types::Value;

use crate::error::{CoreError, Result};
use crate::models::{ColumnType, RawValue};
use crate::utils::StringUtils;

/// Naive date-time layouts tried in order. Year-first layouts only.
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only layouts tried in order. Year-first layouts only.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Fallback layouts: month/day/two-digit year, e.g. `1/15/90`, then
/// two-digit year first, e.g. `90-01-15`
const FALLBACK_DATE_FORMATS: [&str; 2] = ["%m/%d/%y", "%y-%m-%d"];

/// Output layout, millisecond precision in UTC
const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Coerce one raw value into the engine literal for `column_type`
pub fn coerce(value: &RawValue, column_type: ColumnType) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }

    match column_type {
        ColumnType::DateTime => coerce_datetime(value),
        ColumnType::Real => coerce_number(value, false),
        ColumnType::Integer | ColumnType::IntegerPrimaryKey => coerce_number(value, true),
        _ => Ok(passthrough(value)),
    }
}

fn conversion_error(value: &RawValue, column_type: ColumnType) -> CoreError {
    CoreError::ValueConversion {
        value: StringUtils::truncate(&value.to_string(), 64),
        target: column_type.to_string(),
    }
}

fn passthrough(value: &RawValue) -> Value {
    match value {
        RawValue::Null => Value::Null,
        RawValue::Bool(b) => Value::Integer(i64::from(*b)),
        RawValue::Integer(i) => Value::Integer(*i),
        RawValue::Float(f) => Value::Real(*f),
        RawValue::Text(s) => Value::Text(s.clone()),
    }
}

fn coerce_datetime(value: &RawValue) -> Result<Value> {
    let parsed = match value {
        RawValue::Text(s) if s.trim().is_empty() => return Ok(Value::Null),
        RawValue::Text(s) => parse_datetime(s.trim()),
        // Numbers are milliseconds since the Unix epoch
        RawValue::Integer(ms) => Utc.timestamp_millis_opt(*ms).single(),
        RawValue::Float(ms) if ms.is_finite() => Utc.timestamp_millis_opt(*ms as i64).single(),
        _ => None,
    };

    parsed
        .map(|dt| Value::Text(dt.format(ISO_FORMAT).to_string()))
        .ok_or_else(|| conversion_error(value, ColumnType::DateTime))
}

/// Parse a date or date-time string, falling back to two-digit year dates
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    parse_standard_datetime(s).or_else(|| {
        FALLBACK_DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Utc.from_utc_datetime(&dt))
    })
}

fn parse_standard_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Zoned date-time without seconds
    let zoned = match s.strip_suffix('Z') {
        Some(rest) => format!("{}+00:00", rest),
        None => s.to_string(),
    };
    if let Ok(dt) = DateTime::parse_from_str(&zoned, "%Y-%m-%dT%H:%M%:z") {
        return Some(dt.with_timezone(&Utc));
    }

    if starts_with_year(s) {
        // `YYYY-MM-DD HH` carries no minutes
        let padded = if s.len() == 13 { format!("{}:00", s) } else { s.to_string() };
        for format in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&padded, format) {
                return Some(Utc.from_utc_datetime(&dt));
            }
        }
        for format in DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(s, format) {
                return d.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt));
            }
        }
    }

    if ends_with_year(s) {
        if let Ok(d) = NaiveDate::parse_from_str(s, "%m/%d/%Y") {
            return d.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt));
        }
    }

    None
}

fn starts_with_year(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() > 4 && bytes[..4].iter().all(u8::is_ascii_digit) && !bytes[4].is_ascii_digit()
}

fn ends_with_year(s: &str) -> bool {
    match s.rsplit_once('/') {
        Some((_, year)) => year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

fn coerce_number(value: &RawValue, integral: bool) -> Result<Value> {
    let target = if integral { ColumnType::Integer } else { ColumnType::Real };

    let number = match value {
        RawValue::Null => return Ok(Value::Null),
        RawValue::Bool(b) => return Ok(Value::Integer(i64::from(*b))),
        RawValue::Integer(i) if integral => return Ok(Value::Integer(*i)),
        RawValue::Integer(i) => *i as f64,
        RawValue::Float(f) => *f,
        RawValue::Text(s) => {
            let normalized = match normalize_number(s, integral) {
                Some(n) => n,
                // Blank cells carry no value
                None => return Ok(Value::Null),
            };
            if integral {
                if let Ok(i) = normalized.parse::<i64>() {
                    return Ok(Value::Integer(i));
                }
            }
            normalized
                .parse::<f64>()
                .map_err(|_| conversion_error(value, target))?
        }
    };

    if !number.is_finite() {
        return Err(conversion_error(value, target));
    }
    if integral && number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        return Ok(Value::Integer(number as i64));
    }
    Ok(Value::Real(number))
}

/// Normalize a number written with `,` and `.` separators in either locale.
///
/// Whichever separator occurs last is the decimal separator, every other
/// separator is dropped as a thousands separator. For integral columns a
/// last separator followed by exactly three digits is a thousands separator,
/// matching how the classifier reads `1,234` as INTEGER.
/// Returns `None` for blank input.
pub fn normalize_number(input: &str, integral: bool) -> Option<String> {
    let compact = StringUtils::remove_whitespace(input);
    if compact.is_empty() {
        return None;
    }

    let last_comma = compact.rfind(',');
    let last_period = compact.rfind('.');

    let decimal_at = match (last_comma, last_period) {
        (Some(c), Some(p)) => Some(c.max(p)),
        (Some(c), None) => Some(c),
        (None, Some(p)) => Some(p),
        (None, None) => None,
    };

    let decimal_at = decimal_at.filter(|at| !(integral && compact.len() - at - 1 == 3));

    let normalized = compact
        .char_indices()
        .filter_map(|(i, c)| match c {
            _ if Some(i) == decimal_at => Some('.'),
            ',' | '.' => None,
            other => Some(other),
        })
        .collect();
    Some(normalized)
}
