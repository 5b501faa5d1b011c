//! Point sink abstraction for loxflux
//!
//! This module defines the trait the ingestion loop writes through and the
//! error type sink implementations report.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::DataPoint;

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Sink error types
#[derive(Error, Debug)]
pub enum SinkError {
    /// The request never produced a response (connect, TLS, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("Write rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The sink could not be constructed
    #[error("Client setup error: {0}")]
    Setup(String),
}

impl SinkError {
    /// Check if the error is transient
    ///
    /// Nothing retries today; the classification is logged so dropped points
    /// can be told apart from rejected ones.
    pub fn is_retryable(&self) -> bool {
        match self {
            SinkError::Transport(_) => true,
            SinkError::Rejected { status, .. } => *status == 429 || *status >= 500,
            SinkError::Setup(_) => false,
        }
    }
}

/// Convert sink errors to application errors
impl From<SinkError> for crate::error::Error {
    fn from(err: SinkError) -> Self {
        crate::error::Error::sink(err.to_string())
    }
}

/// Destination for parsed points
#[async_trait]
pub trait PointSink: Send + Sync {
    /// Persist a batch of points; the ingestion loop passes one at a time
    async fn write(&self, points: &[DataPoint]) -> SinkResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_error_retryable() {
        assert!(SinkError::Transport("refused".to_string()).is_retryable());
        assert!(SinkError::Rejected {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(SinkError::Rejected {
            status: 429,
            body: String::new()
        }
        .is_retryable());
        assert!(!SinkError::Rejected {
            status: 400,
            body: "partial write".to_string()
        }
        .is_retryable());
        assert!(!SinkError::Setup("bad certificate store".to_string()).is_retryable());
    }

    #[test]
    fn test_sink_error_display() {
        let err = SinkError::Rejected {
            status: 404,
            body: "database not found: \"loxone\"".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("404"));
        assert!(display.contains("database not found"));
    }
}
