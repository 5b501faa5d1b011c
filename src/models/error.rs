//! Parse error types for loxflux models
//!
//! This module defines the errors produced by the line parser. Each variant
//! carries the raw line that failed so it can be logged verbatim.

use thiserror::Error;

/// Result type alias for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors produced while turning one Loxone log line into a data point
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line has fewer than the three mandatory fields
    #[error("Expected at least {expected} fields, found {found}: '{raw}'")]
    InsufficientFields {
        raw: String,
        expected: usize,
        found: usize,
    },

    /// Field 0 is not a `YYYY-MM-DD HH:MM:SS` timestamp
    #[error("Malformed timestamp '{timestamp}': '{raw}'")]
    MalformedTimestamp { raw: String, timestamp: String },

    /// The local timestamp does not exist in the source timezone (DST gap)
    #[error("Timestamp '{timestamp}' does not exist in the source timezone: '{raw}'")]
    NonexistentLocalTime { raw: String, timestamp: String },

    /// The value part is not a finite number
    #[error("Non-numeric value '{value}': '{raw}'")]
    NonNumericValue { raw: String, value: String },

    /// Neither field 1 nor an alias supplied a measurement name
    #[error("Missing measurement name: '{raw}'")]
    EmptyMeasurement { raw: String },
}

impl ParseError {
    /// The raw line that failed to parse
    pub fn raw(&self) -> &str {
        match self {
            ParseError::InsufficientFields { raw, .. }
            | ParseError::MalformedTimestamp { raw, .. }
            | ParseError::NonexistentLocalTime { raw, .. }
            | ParseError::NonNumericValue { raw, .. }
            | ParseError::EmptyMeasurement { raw } => raw,
        }
    }

    /// Short machine-readable label, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::InsufficientFields { .. } => "insufficient_fields",
            ParseError::MalformedTimestamp { .. } => "malformed_timestamp",
            ParseError::NonexistentLocalTime { .. } => "nonexistent_local_time",
            ParseError::NonNumericValue { .. } => "non_numeric_value",
            ParseError::EmptyMeasurement { .. } => "empty_measurement",
        }
    }
}

/// Convert parse errors to application errors
impl From<ParseError> for crate::error::Error {
    fn from(err: ParseError) -> Self {
        crate::error::Error::parse(err.to_string())
    }
}
