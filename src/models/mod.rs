//! Data models for loxflux
//!
//! This module contains the data point model, the Loxone line parser and
//! the field validation it relies on.

pub mod error;
pub mod line;
pub mod point;
pub mod validation;

// Re-export commonly used types
pub use error::{ParseError, ParseResult};
pub use line::{parse_line, parse_utc_line};
pub use point::{DataPoint, Tags, SOURCE_TAG_KEY, SOURCE_TAG_VALUE};
