//! Field-level validation functions for Loxone log lines
//!
//! Each function checks and converts one field of a line. They return
//! [`ParseError`] variants carrying the full raw line so callers can log the
//! offending input without extra bookkeeping.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Timelike};
use regex::Regex;
use std::sync::OnceLock;

use super::error::{ParseError, ParseResult};

/// Timestamp layout used by the Loxone UDP logger
pub const LOXONE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Lazy static regex pattern
static TIMESTAMP_REGEX: OnceLock<Regex> = OnceLock::new();

/// Get or initialize the timestamp regex pattern
fn timestamp_regex() -> &'static Regex {
    TIMESTAMP_REGEX.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$")
            .expect("Invalid timestamp regex pattern")
    })
}

/// Check the fixed `YYYY-MM-DD HH:MM:SS` layout without parsing
pub fn is_loxone_timestamp(timestamp: &str) -> bool {
    timestamp_regex().is_match(timestamp)
}

/// Validate a Loxone timestamp returning the naive local date and time
pub fn validate_timestamp_field(timestamp: &str, raw: &str) -> ParseResult<NaiveDateTime> {
    let malformed = || ParseError::MalformedTimestamp {
        raw: raw.to_string(),
        timestamp: timestamp.to_string(),
    };

    if !is_loxone_timestamp(timestamp) {
        return Err(malformed());
    }

    // The layout matched; chrono still rejects impossible dates like 2020-13-40
    let naive = NaiveDateTime::parse_from_str(timestamp, LOXONE_TIMESTAMP_FORMAT)
        .map_err(|_| malformed())?;

    // chrono reads `:60` as a leap second
    if naive.nanosecond() >= 1_000_000_000 {
        return Err(malformed());
    }

    Ok(naive)
}

/// Attach a timezone to a naive local timestamp
///
/// Ambiguous local times (the repeated hour when DST ends) resolve to the
/// earlier instant. Local times skipped by a DST transition are rejected.
pub fn localize<Tz: TimeZone>(
    naive: &NaiveDateTime,
    zone: &Tz,
    raw: &str,
) -> ParseResult<DateTime<Tz>> {
    match zone.from_local_datetime(naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(ParseError::NonexistentLocalTime {
            raw: raw.to_string(),
            timestamp: naive.format(LOXONE_TIMESTAMP_FORMAT).to_string(),
        }),
    }
}

/// Validate a numeric value field
///
/// Accepts integers, decimals and an optional leading sign. Surrounding
/// whitespace is ignored. Non-finite values are rejected.
pub fn validate_value_field(value: &str, raw: &str) -> ParseResult<f64> {
    match value.trim().parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(ParseError::NonNumericValue {
            raw: raw.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Validate that a measurement name is present
pub fn validate_measurement(measurement: &str, raw: &str) -> ParseResult<String> {
    if measurement.trim().is_empty() {
        Err(ParseError::EmptyMeasurement {
            raw: raw.to_string(),
        })
    } else {
        Ok(measurement.to_string())
    }
}

/// Split a tag field into a trimmed key/value pair
///
/// `key:value` uses the explicit key; anything else (including an explicit
/// key that is blank) falls back to `default_key`.
pub fn split_tag_field(field: &str, default_key: &str) -> (String, String) {
    match field.split_once(':') {
        Some((key, value)) if !key.trim().is_empty() => {
            (key.trim().to_string(), value.trim().to_string())
        },
        Some((_, value)) => (default_key.to_string(), value.trim().to_string()),
        None => (default_key.to_string(), field.trim().to_string()),
    }
}
