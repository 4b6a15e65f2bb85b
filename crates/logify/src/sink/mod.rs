//! Log sinks.
//!
//! A sink receives every [`LogRecord`] the dispatcher lets through. Each
//! sink fails on its own: an error from one never stops delivery to the
//! next.
//!
//! - [`TracingSink`] - local, synchronous, order-preserving
//! - [`ElasticsearchSink`] - remote, queued, best-effort

pub mod elasticsearch;
pub mod local;

pub use elasticsearch::{ElasticsearchSink, RemoteSinkStats};
pub use local::TracingSink;

use crate::errors::SinkError;
use crate::record::LogRecord;

/// Destination for structured log records.
///
/// `deliver` is called on the request path and must not block on I/O.
/// Sinks that talk to the network hand the record off to a background task.
pub trait LogSink: Send + Sync {
    /// Short name used in self-logs and metric labels.
    fn name(&self) -> &str;

    fn deliver(&self, record: &LogRecord) -> Result<(), SinkError>;
}
