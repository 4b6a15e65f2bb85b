//! The per-service instrumentation handle.

use axum::http::StatusCode;
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::LogifyConfig;
use crate::context::RequestContext;
use crate::dispatcher::LogSinkDispatcher;
use crate::errors::LogifyError;
use crate::failure::{internal_error_response, InternalFailure};
use crate::middleware::{ErrorHandlerLayer, RequestLoggerLayer, ResponseLoggerLayer};
use crate::observability::metrics::{record_http_request, ABORTED_STATUS};
use crate::record::{fields_from, Fields, Level, LogRecord};
use crate::sink::{ElasticsearchSink, LogSink, RemoteSinkStats, TracingSink};
use crate::stats::{duration_ms, ApiStats, Outcome, StatsAggregator};

/// Instrumentation for one service process.
///
/// Cheap to clone; every clone shares the same statistics and sinks. Hand
/// clones to the layers and to handler state rather than building a second
/// instance.
#[derive(Clone)]
pub struct Logify {
    inner: Arc<Inner>,
}

struct Inner {
    service_name: String,
    stats: StatsAggregator,
    dispatcher: LogSinkDispatcher,
    remote: Option<Arc<ElasticsearchSink>>,
}

impl Logify {
    /// Build with the default sinks: [`TracingSink`] then
    /// [`ElasticsearchSink`].
    ///
    /// # Errors
    ///
    /// - `LogifyError::Config` - the configuration is invalid
    /// - `LogifyError::NoRuntime` - called outside a tokio runtime
    /// - `LogifyError::HttpClient` - the remote sink's client could not be built
    pub fn new(config: LogifyConfig) -> Result<Self, LogifyError> {
        config.validate()?;

        let remote = Arc::new(ElasticsearchSink::spawn(
            &config.remote_sink_endpoint,
            &config.index_namespace,
        )?);
        let remote_sink: Arc<dyn LogSink> = remote.clone();
        let sinks: Vec<Arc<dyn LogSink>> = vec![Arc::new(TracingSink::new()), remote_sink];

        Ok(Self::assemble(config, sinks, Some(remote)))
    }

    /// Build with an explicit, ordered sink list.
    ///
    /// The remote endpoint and namespace in `config` are validated but
    /// unused; `remote_sink_stats` returns `None`.
    pub fn with_sinks(
        config: LogifyConfig,
        sinks: Vec<Arc<dyn LogSink>>,
    ) -> Result<Self, LogifyError> {
        config.validate()?;
        Ok(Self::assemble(config, sinks, None))
    }

    fn assemble(
        config: LogifyConfig,
        sinks: Vec<Arc<dyn LogSink>>,
        remote: Option<Arc<ElasticsearchSink>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                service_name: config.service_name,
                stats: StatsAggregator::new(),
                dispatcher: LogSinkDispatcher::new(config.minimum_severity, sinks),
                remote,
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Layers
    // ------------------------------------------------------------------------

    /// Ingress logging. Install outermost.
    pub fn request_logger(&self) -> RequestLoggerLayer {
        RequestLoggerLayer::new(self.clone())
    }

    /// Egress logging and accounting. Install inside the request logger.
    pub fn response_logger(&self) -> ResponseLoggerLayer {
        ResponseLoggerLayer::new(self.clone())
    }

    /// Unhandled failure reporting. Install innermost.
    pub fn error_handler(&self) -> ErrorHandlerLayer {
        ErrorHandlerLayer::new(self.clone())
    }

    /// Apply all three layers to `router` in the required order.
    pub fn instrument<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router
            .layer(self.error_handler())
            .layer(self.response_logger())
            .layer(self.request_logger())
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn service_name(&self) -> &str {
        &self.inner.service_name
    }

    pub fn api_stats(&self) -> ApiStats {
        self.inner.stats.get_stats()
    }

    /// Counters of the built-in remote sink, if this instance owns one.
    pub fn remote_sink_stats(&self) -> Option<RemoteSinkStats> {
        self.inner.remote.as_ref().map(|remote| remote.stats())
    }

    pub fn minimum_severity(&self) -> Level {
        self.inner.dispatcher.minimum_severity()
    }

    // ------------------------------------------------------------------------
    // Process-level logging
    // ------------------------------------------------------------------------

    /// Emit a record outside the request lifecycle.
    ///
    /// `fields` is usually a `json!` object; a `requestId` entry tags the
    /// record with that id.
    pub fn log(&self, level: Level, message: impl Into<String>, fields: Value) {
        if !self.inner.dispatcher.accepts(level) {
            return;
        }
        let record = LogRecord::new(level, self.service_name(), message).with_fields(fields_from(fields));
        self.inner.dispatcher.emit(&record);
    }

    pub fn debug(&self, message: impl Into<String>, fields: Value) {
        self.log(Level::Debug, message, fields);
    }

    pub fn info(&self, message: impl Into<String>, fields: Value) {
        self.log(Level::Info, message, fields);
    }

    pub fn warn(&self, message: impl Into<String>, fields: Value) {
        self.log(Level::Warn, message, fields);
    }

    pub fn error(&self, message: impl Into<String>, fields: Value) {
        self.log(Level::Error, message, fields);
    }

    // ------------------------------------------------------------------------
    // Request lifecycle
    // ------------------------------------------------------------------------

    pub(crate) fn log_ingress(&self, context: &RequestContext, fields: Fields) {
        if !self.inner.dispatcher.accepts(Level::Info) {
            return;
        }
        let record = LogRecord::new(Level::Info, self.service_name(), "Incoming request")
            .with_timestamp(context.arrived_at())
            .with_request_id(context.request_id())
            .with_fields(fields);
        self.inner.dispatcher.emit(&record);
    }

    /// Account for a request that produced a response.
    ///
    /// Returns `false`, with no side effects, if the request was already
    /// finalized.
    pub fn finalize(&self, context: &RequestContext, status: StatusCode, elapsed: Duration) -> bool {
        if !context.try_complete() {
            return false;
        }

        let elapsed_ms = duration_ms(elapsed);
        self.inner.stats.update(elapsed_ms, Outcome::from_status(status));
        record_http_request(
            context.method().as_str(),
            context.endpoint_label(),
            status.as_u16(),
            elapsed,
        );

        let record = LogRecord::new(Level::Info, self.service_name(), "Outgoing response")
            .with_request_id(context.request_id())
            .with_field("statusCode", status.as_u16())
            .with_field("responseTime", elapsed_ms)
            .with_field("method", context.method().as_str())
            .with_field("path", context.path());
        self.inner.dispatcher.emit(&record);
        true
    }

    /// Account for a request that ended in an unhandled failure.
    ///
    /// Returns `false`, with no side effects, if the request was already
    /// finalized.
    pub fn finalize_failure(
        &self,
        context: &RequestContext,
        failure: &InternalFailure,
        elapsed: Duration,
    ) -> bool {
        if !context.try_complete() {
            return false;
        }

        self.inner
            .stats
            .update(duration_ms(elapsed), Outcome::Failure);
        record_http_request(
            context.method().as_str(),
            context.endpoint_label(),
            StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            elapsed,
        );

        self.inner
            .dispatcher
            .emit(&failure_record(self.service_name(), failure).with_request_id(context.request_id()));
        true
    }

    /// Log and account for a failure, then return the sanitized response.
    ///
    /// Without a context (error handler installed without the request
    /// logger) there is no arrival time, so the failure counts with zero
    /// latency and an untagged record.
    pub(crate) fn report_failure(
        &self,
        context: Option<&RequestContext>,
        failure: &InternalFailure,
    ) -> Response {
        match context {
            Some(context) => {
                self.finalize_failure(context, failure, context.elapsed());
            }
            None => {
                self.inner.stats.update(0.0, Outcome::Failure);
                self.inner
                    .dispatcher
                    .emit(&failure_record(self.service_name(), failure));
            }
        }
        internal_error_response()
    }

    /// Account for a request whose response future was dropped.
    pub(crate) fn abort(&self, context: &RequestContext) {
        if !context.try_complete() {
            return;
        }

        let elapsed = context.elapsed();
        let elapsed_ms = duration_ms(elapsed);
        self.inner.stats.update(elapsed_ms, Outcome::Failure);
        record_http_request(
            context.method().as_str(),
            context.endpoint_label(),
            ABORTED_STATUS,
            elapsed,
        );

        let record = LogRecord::new(Level::Warn, self.service_name(), "Request aborted before response")
            .with_request_id(context.request_id())
            .with_field("responseTime", elapsed_ms)
            .with_field("method", context.method().as_str())
            .with_field("path", context.path());
        self.inner.dispatcher.emit(&record);
    }
}

fn failure_record(service: &str, failure: &InternalFailure) -> LogRecord {
    LogRecord::new(Level::Error, service, "Unhandled error")
        .with_field("error", failure.message())
        .with_field("stack", failure.diagnostic())
}

impl std::fmt::Debug for Logify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logify")
            .field("service_name", &self.inner.service_name)
            .field("dispatcher", &self.inner.dispatcher)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::testing::MemorySink;
    use axum::http::Method;
    use serde_json::json;
    use uuid::Uuid;

    fn logify_with_memory(level: Level) -> (Logify, Arc<MemorySink>) {
        let memory = Arc::new(MemorySink::new());
        let logify = Logify::with_sinks(
            LogifyConfig::new("orders").with_minimum_severity(level),
            vec![memory.clone()],
        )
        .unwrap();
        (logify, memory)
    }

    #[test]
    fn test_new_requires_runtime() {
        let result = Logify::new(LogifyConfig::new("orders"));
        assert!(matches!(result, Err(LogifyError::NoRuntime)));
    }

    #[test]
    fn test_with_sinks_validates_config() {
        let result = Logify::with_sinks(LogifyConfig::new(""), vec![]);
        assert!(matches!(result, Err(LogifyError::Config(_))));
    }

    #[tokio::test]
    async fn test_new_exposes_remote_stats() {
        let logify = Logify::new(LogifyConfig::new("orders")).unwrap();
        assert_eq!(logify.remote_sink_stats(), Some(RemoteSinkStats::default()));
    }

    #[test]
    fn test_with_sinks_has_no_remote_stats() {
        let (logify, _) = logify_with_memory(Level::Info);
        assert_eq!(logify.remote_sink_stats(), None);
    }

    #[test]
    fn test_process_level_logging() {
        let (logify, memory) = logify_with_memory(Level::Info);
        let id = Uuid::new_v4();

        logify.debug("dropped", json!({}));
        logify.info("Service started", json!({ "port": 3003 }));
        logify.warn("Order not found", json!({ "requestId": id.to_string(), "orderId": "7" }));

        let records = memory.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].service(), "orders");
        assert_eq!(records[0].field("port"), Some(&json!(3003)));
        assert_eq!(records[0].request_id(), None);
        assert_eq!(records[1].level(), Level::Warn);
        assert_eq!(records[1].request_id(), Some(id));
    }

    #[test]
    fn test_finalize_twice_counts_once() {
        let (logify, memory) = logify_with_memory(Level::Info);
        let context = RequestContext::new(Method::GET, "/api/orders/1");

        assert!(logify.finalize(&context, StatusCode::OK, Duration::from_millis(5)));
        let after_first = logify.api_stats();
        assert!(!logify.finalize(&context, StatusCode::OK, Duration::from_millis(5)));

        assert_eq!(logify.api_stats(), after_first);
        assert_eq!(after_first.total_requests, 1);
        assert_eq!(memory.find_all("Outgoing response").len(), 1);
    }

    #[test]
    fn test_finalize_and_failure_are_exclusive() {
        let (logify, memory) = logify_with_memory(Level::Info);
        let context = RequestContext::new(Method::POST, "/api/orders");
        let failure = InternalFailure::new("boom", "trace");

        assert!(logify.finalize_failure(&context, &failure, Duration::from_millis(10)));
        assert!(!logify.finalize(&context, StatusCode::INTERNAL_SERVER_ERROR, Duration::from_millis(10)));

        let stats = logify.api_stats();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.failed_requests, 1);
        assert!(memory.find("Outgoing response").is_none());
    }

    #[test]
    fn test_egress_record_fields() {
        let (logify, memory) = logify_with_memory(Level::Info);
        let context = RequestContext::new(Method::POST, "/api/orders");

        logify.finalize(&context, StatusCode::CREATED, Duration::from_millis(50));

        let record = memory.find("Outgoing response").unwrap();
        assert_eq!(record.level(), Level::Info);
        assert_eq!(record.request_id(), Some(context.request_id()));
        assert_eq!(record.field("statusCode"), Some(&json!(201)));
        assert_eq!(record.field("responseTime"), Some(&json!(50.0)));
        assert_eq!(record.field("method"), Some(&json!("POST")));
        assert_eq!(record.field("path"), Some(&json!("/api/orders")));
    }

    #[test]
    fn test_failure_record_carries_diagnostic() {
        let (logify, memory) = logify_with_memory(Level::Info);
        let context = RequestContext::new(Method::GET, "/api/orders/1");

        logify.finalize_failure(
            &context,
            &InternalFailure::new("db down", "caused by: connection reset"),
            Duration::from_millis(1),
        );

        let record = memory.find("Unhandled error").unwrap();
        assert_eq!(record.level(), Level::Error);
        assert_eq!(record.request_id(), Some(context.request_id()));
        assert_eq!(record.field("error"), Some(&json!("db down")));
        assert_eq!(record.field("stack"), Some(&json!("caused by: connection reset")));
    }

    #[test]
    fn test_report_failure_without_context_counts_failure() {
        let (logify, memory) = logify_with_memory(Level::Info);
        let context = RequestContext::new(Method::GET, "/api/orders/1");
        logify.finalize(&context, StatusCode::OK, Duration::from_millis(40));

        let response = logify.report_failure(None, &InternalFailure::new("boom", "trace"));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            logify.api_stats(),
            ApiStats {
                total_requests: 2,
                successful_requests: 1,
                failed_requests: 1,
                average_response_time_ms: 20.0,
            }
        );
        assert!(memory.find("Unhandled error").is_some());
    }

    #[test]
    fn test_abort_counts_failure_once() {
        let (logify, memory) = logify_with_memory(Level::Info);
        let context = RequestContext::new(Method::GET, "/api/orders/1");

        logify.abort(&context);
        logify.abort(&context);

        let stats = logify.api_stats();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.failed_requests, 1);
        let record = memory.find("Request aborted before response").unwrap();
        assert_eq!(record.level(), Level::Warn);
    }
}
