//! Data point model for loxflux
//!
//! A [`DataPoint`] is the structured form of one Loxone log line: one
//! measurement, one UTC timestamp, one float value and a set of string tags.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Tag key every point carries
pub const SOURCE_TAG_KEY: &str = "Source";

/// Value of the [`SOURCE_TAG_KEY`] tag
pub const SOURCE_TAG_VALUE: &str = "Loxone";

/// Name of the single field written for each point
pub const VALUE_FIELD: &str = "value";

/// Tag set of a point, ordered by key
pub type Tags = BTreeMap<String, String>;

/// One parsed telemetry sample ready for the sink
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    /// Metric series name
    pub measurement: String,

    /// When the sample was taken, second precision
    pub timestamp: DateTime<Utc>,

    /// `timestamp` rendered as RFC 3339 in the target zone, `Z` for UTC
    /// (`YYYY-MM-DDTHH:MM:SSZ`)
    pub time: String,

    /// Sample value
    pub value: f64,

    /// Tags, always including `Source = "Loxone"`
    pub tags: Tags,
}

impl DataPoint {
    /// Create a point timestamped in UTC
    pub fn new(
        measurement: impl Into<String>,
        timestamp: DateTime<Utc>,
        value: f64,
        tags: Tags,
    ) -> Self {
        Self {
            measurement: measurement.into(),
            time: timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            timestamp,
            value,
            tags,
        }
    }

    /// Look up a tag value
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Unix timestamp in seconds
    pub fn epoch_seconds(&self) -> i64 {
        self.timestamp.timestamp()
    }
}

/// Serializes in the shape InfluxDB JSON clients use:
/// `{"measurement", "tags", "time", "fields": {"value"}}`
impl Serialize for DataPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut fields = BTreeMap::new();
        fields.insert(VALUE_FIELD, self.value);

        let mut state = serializer.serialize_struct("DataPoint", 4)?;
        state.serialize_field("measurement", &self.measurement)?;
        state.serialize_field("tags", &self.tags)?;
        state.serialize_field("time", &self.time)?;
        state.serialize_field("fields", &fields)?;
        state.end()
    }
}
