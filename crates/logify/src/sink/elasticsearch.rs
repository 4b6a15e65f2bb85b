//! Remote sink for an Elasticsearch-compatible search backend.
//!
//! `deliver` only enqueues. A single background worker owns the HTTP client
//! and indexes records one at a time, in the order they were queued, into a
//! daily index: `{endpoint}/{namespace}-{YYYY.MM.DD}/_doc`.
//!
//! Delivery is best-effort. A full queue drops the record, and HTTP or
//! transport failures are counted and self-logged at debug level. Nothing
//! is retried.

use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

use crate::errors::{LogifyError, SinkError};
use crate::observability::metrics::record_remote_delivery;
use crate::record::LogRecord;
use crate::sink::LogSink;

/// Records buffered between the request path and the worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Upper bound on a single index request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Delivery counters for the remote sink.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemoteSinkStats {
    /// Accepted by the backend (2xx).
    pub delivered: u64,
    /// Rejected by the backend or lost in transport.
    pub failed: u64,
    /// Never sent because the queue was full or the worker had stopped.
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    delivered: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> RemoteSinkStats {
        RemoteSinkStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// One queued index request.
struct Envelope {
    url: String,
    document: Value,
}

/// Queue-backed remote sink.
pub struct ElasticsearchSink {
    endpoint: String,
    namespace: String,
    sender: mpsc::Sender<Envelope>,
    counters: Arc<Counters>,
}

impl ElasticsearchSink {
    /// Build the sink and spawn its worker on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// - `LogifyError::NoRuntime` - called outside a tokio runtime
    /// - `LogifyError::HttpClient` - the HTTP client could not be built
    pub fn spawn(endpoint: &str, namespace: &str) -> Result<Self, LogifyError> {
        Self::spawn_with_capacity(endpoint, namespace, DEFAULT_QUEUE_CAPACITY)
    }

    /// Like [`ElasticsearchSink::spawn`] with an explicit queue capacity
    /// (minimum 1).
    pub fn spawn_with_capacity(
        endpoint: &str,
        namespace: &str,
        capacity: usize,
    ) -> Result<Self, LogifyError> {
        let runtime = Handle::try_current().map_err(|_| LogifyError::NoRuntime)?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| LogifyError::HttpClient(format!("Failed to build HTTP client: {e}")))?;

        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let counters = Arc::new(Counters::default());

        let worker = Worker {
            client,
            receiver,
            counters: Arc::clone(&counters),
        };
        runtime.spawn(worker.run());

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            namespace: namespace.to_string(),
            sender,
            counters,
        })
    }

    /// Index URL for a record, derived from the record's own timestamp.
    pub fn document_url(&self, record: &LogRecord) -> String {
        format!(
            "{}/{}-{}/_doc",
            self.endpoint,
            self.namespace,
            record.timestamp().format("%Y.%m.%d")
        )
    }

    pub fn stats(&self) -> RemoteSinkStats {
        self.counters.snapshot()
    }

    fn drop_record(&self) {
        self.counters.dropped.fetch_add(1, Ordering::Relaxed);
        record_remote_delivery("dropped");
    }
}

impl LogSink for ElasticsearchSink {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    fn deliver(&self, record: &LogRecord) -> Result<(), SinkError> {
        let envelope = Envelope {
            url: self.document_url(record),
            document: record.to_document()?,
        };

        match self.sender.try_send(envelope) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.drop_record();
                Err(SinkError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => {
                self.drop_record();
                Err(SinkError::Closed)
            }
        }
    }
}

/// Background task draining the queue. Exits once every sender is gone.
struct Worker {
    client: reqwest::Client,
    receiver: mpsc::Receiver<Envelope>,
    counters: Arc<Counters>,
}

impl Worker {
    async fn run(mut self) {
        while let Some(envelope) = self.receiver.recv().await {
            self.index(envelope).await;
        }
        debug!(target: "logify.sink", "Remote sink worker stopped");
    }

    async fn index(&self, envelope: Envelope) {
        let result = self
            .client
            .post(&envelope.url)
            .json(&envelope.document)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                self.counters.delivered.fetch_add(1, Ordering::Relaxed);
                record_remote_delivery("delivered");
            }
            Ok(response) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                record_remote_delivery("failed");
                debug!(
                    target: "logify.sink",
                    status = %response.status(),
                    url = %envelope.url,
                    "Remote backend rejected log record"
                );
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                record_remote_delivery("failed");
                debug!(
                    target: "logify.sink",
                    error = %e,
                    url = %envelope.url,
                    "Failed to send log record to remote backend"
                );
            }
        }
    }
}
