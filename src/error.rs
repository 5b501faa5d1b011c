//! Error handling module for loxflux
//!
//! This module defines the application-level error type. Per-datagram
//! failures never reach it: the ingestion loop logs and drops them. It covers
//! startup and wiring failures that end the process.

use thiserror::Error;

/// Result type alias for loxflux operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for loxflux
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Line parsing errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Storage sink errors
    #[error("Sink error: {0}")]
    Sink(String),

    /// IO errors (socket bind, receive)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a sink error
    pub fn sink<S: Into<String>>(msg: S) -> Self {
        Error::Sink(msg.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) => 78,
            Error::Io(_) => 74,
            Error::Parse(_) => 65,
            Error::Sink(_) => 69,
            Error::Internal(_) => 70,
        }
    }
}

/// Convert from envconfig::Error to our Error type
impl From<envconfig::Error> for Error {
    fn from(err: envconfig::Error) -> Self {
        Error::Config(err.to_string())
    }
}
