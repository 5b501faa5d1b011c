//! InfluxDB Line Protocol encoding.
//!
//! Line Protocol format:
//! ```text
//! measurement,tag1=val1,tag2=val2 value=23.5 timestamp_s
//! ```
//!
//! Points are written with `precision=s`, so timestamps are Unix seconds.

use crate::models::point::VALUE_FIELD;
use crate::models::DataPoint;

/// Encode one point as a Line Protocol line.
///
/// Tags come out sorted by key. Tags with an empty key or value are skipped
/// because Line Protocol cannot express them. The value is always written as
/// a float field (no `i` suffix).
pub fn encode_point(point: &DataPoint) -> String {
    let mut line = escape_measurement(&point.measurement);

    for (key, value) in &point.tags {
        if key.is_empty() || value.is_empty() {
            continue;
        }
        line.push(',');
        line.push_str(&escape_tag(key));
        line.push('=');
        line.push_str(&escape_tag(value));
    }

    line.push(' ');
    line.push_str(VALUE_FIELD);
    line.push('=');
    line.push_str(&format_float(point.value));

    line.push(' ');
    line.push_str(&point.epoch_seconds().to_string());

    line
}

/// Encode a batch of points, one line each.
pub fn encode_points(points: &[DataPoint]) -> String {
    points.iter().map(encode_point).collect::<Vec<_>>().join("\n")
}

/// Shortest round-trip rendering; `23.0` becomes `23`, still a float field.
fn format_float(value: f64) -> String {
    format!("{}", value)
}

/// Escape measurement name for Line Protocol.
/// Backslashes first, then newlines, commas and spaces.
fn escape_measurement(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(' ', "\\ ")
}

/// Escape tag key or value for Line Protocol.
/// Same as measurements, plus equals signs.
fn escape_tag(s: &str) -> String {
    escape_measurement(s).replace('=', "\\=")
}
