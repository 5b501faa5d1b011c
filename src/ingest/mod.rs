//! UDP ingestion module
//!
//! This module provides:
//! - Datagram sources (the bound UDP socket)
//! - Per-datagram processing: UTF-8 decode, line parse, sink write
//! - The ingestion loop that runs until the process is stopped

mod listener;
mod processor;
mod source;

pub use listener::IngestionLoop;
pub use processor::MessageProcessor;
pub use source::{DatagramSource, UdpSource};

use std::net::SocketAddr;
use thiserror::Error;

use crate::models::ParseError;
use crate::sink::SinkError;

/// Reasons a datagram did not become a stored point
#[derive(Debug, Error)]
pub enum IngestError {
    /// Payload is not valid UTF-8
    #[error("Datagram from {peer} is not valid UTF-8: {source}")]
    Decode {
        peer: SocketAddr,
        #[source]
        source: std::str::Utf8Error,
    },

    /// Payload is not a valid Loxone line
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The sink failed to store the point; the point is dropped
    #[error("Failed to write point '{measurement}': {source}")]
    Write {
        measurement: String,
        #[source]
        source: SinkError,
    },
}

impl IngestError {
    /// Short label for structured logging
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Decode { .. } => "decode",
            IngestError::Parse(_) => "parse",
            IngestError::Write { .. } => "write",
        }
    }
}
