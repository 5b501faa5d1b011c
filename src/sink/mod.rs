//! Storage sink module for loxflux
//!
//! This module provides the sink abstraction the ingestion loop writes
//! through and its InfluxDB implementation.

pub mod influx;
pub mod line_protocol;
pub mod writer;

// Re-export commonly used types
pub use influx::InfluxSink;
pub use line_protocol::{encode_point, encode_points};
pub use writer::{PointSink, SinkError, SinkResult};
