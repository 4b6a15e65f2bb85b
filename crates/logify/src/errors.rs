//! Logify error types.
//!
//! Only construction can fail visibly. Sink delivery errors are reported to
//! the dispatcher, which swallows them: logging must never fail a request.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors building a [`crate::Logify`] instance.
#[derive(Debug, Error)]
pub enum LogifyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Remote sink requires a running tokio runtime")]
    NoRuntime,

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Errors a sink may report for a single delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// Bounded queue is full; the record was dropped.
    #[error("Sink queue is full")]
    QueueFull,

    /// Background worker has stopped.
    #[error("Sink is closed")]
    Closed,

    #[error("Failed to encode record: {0}")]
    Encode(String),

    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Encode(err.to_string())
    }
}
