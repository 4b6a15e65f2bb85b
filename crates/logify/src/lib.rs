//! Logify: request/response instrumentation for axum services.
//!
//! One [`Logify`] instance per service process owns the running
//! [`ApiStats`] and an ordered list of [`LogSink`]s. Three tower layers
//! hook it into a router:
//!
//! - [`RequestLoggerLayer`] - assigns the request id, logs ingress
//! - [`ResponseLoggerLayer`] - times the request, updates stats, logs egress
//! - [`ErrorHandlerLayer`] - converts panics and internal failures into a
//!   sanitized 500, logging the diagnostic
//!
//! Every request is accounted for exactly once, whichever path finishes it.
//!
//! ```rust,ignore
//! let logify = Logify::new(LogifyConfig::from_env()?)?;
//! let app = logify.instrument(Router::new().route("/api/orders", post(create_order)));
//! ```
//!
//! Records go to a local `tracing` sink and, best-effort, to an
//! Elasticsearch-compatible backend. A remote outage never affects a
//! request.

pub mod config;
pub mod context;
pub mod dispatcher;
pub mod errors;
pub mod failure;
pub mod instrumentation;
pub mod middleware;
pub mod observability;
pub mod record;
pub mod sink;
pub mod stats;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::{ConfigError, LogifyConfig};
pub use context::{CurrentRequest, RequestContext, RequestContextExt, X_REQUEST_ID};
pub use dispatcher::LogSinkDispatcher;
pub use errors::{LogifyError, SinkError};
pub use failure::{internal_error_response, InternalFailure};
pub use instrumentation::Logify;
pub use middleware::{ErrorHandlerLayer, RequestLoggerLayer, ResponseLoggerLayer};
pub use record::{Fields, Level, LogRecord};
pub use sink::{ElasticsearchSink, LogSink, RemoteSinkStats, TracingSink};
pub use stats::{ApiStats, Outcome, StatsAggregator};
