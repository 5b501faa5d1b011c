//! Loxone UDP line parser
//!
//! Line format:
//! ```text
//! <timestamp>;<measurement>;[alias:]<value>[;<tag1>][;<tag2>][;<tag3>]
//! ```
//!
//! Example: `2020-09-10 19:46:20;Bedroom temperature;23.0`
//!
//! Parsing is pure: the same line and timezone pair always yield the same
//! point.

use chrono::{SecondsFormat, TimeZone, Utc};

use super::error::{ParseError, ParseResult};
use super::point::{DataPoint, Tags, SOURCE_TAG_KEY, SOURCE_TAG_VALUE};
use super::validation::{
    localize, split_tag_field, validate_measurement, validate_timestamp_field,
    validate_value_field,
};

/// Field separator of the wire format
pub const FIELD_SEPARATOR: char = ';';

/// Number of mandatory fields (timestamp, measurement, value)
pub const REQUIRED_FIELDS: usize = 3;

/// Default keys for the optional tag fields at positions 3, 4 and 5
pub const DEFAULT_TAG_KEYS: [&str; 3] = ["Tag_1", "Tag_2", "Tag_3"];

/// Parse one log line into a data point
///
/// `source_zone` is the zone the controller's wall-clock timestamp is
/// expressed in; `target_zone` is the zone the rendered `time` is expressed
/// in (UTC in production). `time` always carries the target offset, written
/// as `Z` when it is zero, so it names the same instant as `timestamp`.
///
/// # Errors
/// Returns a [`ParseError`] carrying `raw` when the line has fewer than three
/// fields, a malformed timestamp, a non-numeric value or no measurement name.
pub fn parse_line<Src, Dst>(raw: &str, source_zone: &Src, target_zone: &Dst) -> ParseResult<DataPoint>
where
    Src: TimeZone,
    Dst: TimeZone,
    Dst::Offset: std::fmt::Display,
{
    tracing::debug!(raw = %raw, "Received line");

    let fields: Vec<&str> = raw.split(FIELD_SEPARATOR).collect();
    if fields.len() < REQUIRED_FIELDS {
        return Err(ParseError::InsufficientFields {
            raw: raw.to_string(),
            expected: REQUIRED_FIELDS,
            found: fields.len(),
        });
    }

    // Timestamp: naive local time in the source zone, rendered in the target zone
    let naive = validate_timestamp_field(fields[0], raw)?;
    let local = localize(&naive, source_zone, raw)?;
    let converted = local.with_timezone(target_zone);
    let time = converted.to_rfc3339_opts(SecondsFormat::Secs, true);

    // Measurement and value; an alias replaces field 1
    let (name, value) = match fields[2].split_once(':') {
        Some((alias, value)) => (alias, value),
        None => (fields[1], fields[2]),
    };
    let measurement = validate_measurement(name, raw)?;
    let value = validate_value_field(value, raw)?;

    let tags = merge_tags(tag_fields(&fields));

    if fields.len() > REQUIRED_FIELDS + DEFAULT_TAG_KEYS.len() {
        tracing::debug!(
            extra_fields = fields.len() - REQUIRED_FIELDS - DEFAULT_TAG_KEYS.len(),
            "Ignoring fields beyond the third tag"
        );
    }

    let point = DataPoint {
        measurement,
        timestamp: converted.with_timezone(&Utc),
        time,
        value,
        tags,
    };

    if tracing::enabled!(tracing::Level::DEBUG) {
        if let Ok(json) = serde_json::to_string_pretty(&point) {
            tracing::debug!("Parsed point:\n{}", json);
        }
    }

    Ok(point)
}

/// Parse a line sent by a controller whose clock runs in UTC
pub fn parse_utc_line(raw: &str) -> ParseResult<DataPoint> {
    parse_line(raw, &Utc, &Utc)
}

/// Collect the optional tag fields as positional key/value pairs
fn tag_fields(fields: &[&str]) -> [Option<(String, String)>; 3] {
    let mut tags: [Option<(String, String)>; 3] = Default::default();
    for (slot, default_key) in DEFAULT_TAG_KEYS.iter().enumerate() {
        tags[slot] = fields
            .get(REQUIRED_FIELDS + slot)
            .map(|field| split_tag_field(field, default_key));
    }
    tags
}

/// Merge positional tags in order, then apply the fixed `Source` tag
fn merge_tags(positional: [Option<(String, String)>; 3]) -> Tags {
    let mut tags: Tags = positional.into_iter().flatten().collect();
    tags.insert(SOURCE_TAG_KEY.to_string(), SOURCE_TAG_VALUE.to_string());
    tags
}
