//! loxflux Library
//!
//! This library exposes the core modules of loxflux for use in integration tests
//! and as a library for other applications.

pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod sink;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used types at the crate root
pub use config::{Cli, Config};
pub use error::{Error, Result};

// Re-export model types
pub use models::{parse_line, parse_utc_line, DataPoint, ParseError, Tags};

// Re-export pipeline types
pub use ingest::{DatagramSource, IngestError, IngestionLoop, MessageProcessor, UdpSource};
pub use sink::{InfluxSink, PointSink, SinkError};

