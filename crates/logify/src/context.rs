//! Per-request correlation context.
//!
//! [`CorrelationTagger`] creates one [`RequestContext`] per inbound request
//! and stores it in the request extensions as `Arc<RequestContext>`. Both
//! finalizing layers (response observation and failure reporting) read it
//! from there; whichever flips the completion flag first owns the
//! accounting for that request.

use axum::async_trait;
use axum::extract::{FromRequestParts, MatchedPath};
use axum::http::request::Parts;
use axum::http::{Method, Request};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::failure::InternalFailure;
use crate::observability::metrics::UNMATCHED_ENDPOINT;
use crate::stats::duration_ms;

/// Header carrying the correlation id back to the caller.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation state for one in-flight request.
#[derive(Debug)]
pub struct RequestContext {
    request_id: Uuid,
    arrived_at: DateTime<Utc>,
    started: Instant,
    method: Method,
    path: String,
    route: Option<String>,
    completed: AtomicBool,
}

impl RequestContext {
    /// Create a context with a fresh random (v4) identifier, arriving now.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            arrived_at: Utc::now(),
            started: Instant::now(),
            method,
            path: path.into(),
            route: None,
            completed: AtomicBool::new(false),
        }
    }

    /// Record the route template the request matched.
    #[must_use]
    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Wall-clock arrival time.
    pub fn arrived_at(&self) -> DateTime<Utc> {
        self.arrived_at
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Matched route template (e.g. `/api/orders/:id`), if routing happened
    /// before tagging.
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Bounded-cardinality label for metrics.
    pub(crate) fn endpoint_label(&self) -> &str {
        self.route().unwrap_or(UNMATCHED_ENDPOINT)
    }

    /// Time since arrival, measured on the monotonic clock.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time since arrival in fractional milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        duration_ms(self.elapsed())
    }

    /// Whether the request has already been accounted for.
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Flip the completion flag. Returns `true` only for the first caller.
    pub(crate) fn try_complete(&self) -> bool {
        self.completed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Assigns correlation contexts to inbound requests.
pub struct CorrelationTagger;

impl CorrelationTagger {
    /// Attach a context to `request` unless one is already present.
    ///
    /// Returns the context and whether it was created by this call.
    pub fn tag<B>(request: &mut Request<B>) -> (Arc<RequestContext>, bool) {
        if let Some(existing) = request.extensions().get::<Arc<RequestContext>>() {
            return (Arc::clone(existing), false);
        }

        let mut context = RequestContext::new(request.method().clone(), request.uri().path());
        if let Some(matched) = request.extensions().get::<MatchedPath>() {
            context = context.with_route(matched.as_str());
        }
        let context = Arc::new(context);
        request.extensions_mut().insert(Arc::clone(&context));
        (context, true)
    }
}

/// Extension trait for reading the correlation context off a request.
pub trait RequestContextExt {
    /// Returns `None` if the request logger layer was not applied.
    fn request_context(&self) -> Option<&Arc<RequestContext>>;
}

impl<B> RequestContextExt for Request<B> {
    fn request_context(&self) -> Option<&Arc<RequestContext>> {
        self.extensions().get::<Arc<RequestContext>>()
    }
}

/// Extractor giving handlers the current request's context.
///
/// ```rust,ignore
/// async fn get_order(CurrentRequest(ctx): CurrentRequest) -> impl IntoResponse {
///     logify.info("Fetching order", json!({ "requestId": ctx.request_id() }));
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentRequest(pub Arc<RequestContext>);

/// Rejection used when a handler asks for [`CurrentRequest`] on a router
/// that was not instrumented.
#[derive(Debug)]
pub struct MissingRequestContext;

impl IntoResponse for MissingRequestContext {
    fn into_response(self) -> Response {
        InternalFailure::new(
            "Request context missing",
            "CurrentRequest extractor used on a route without RequestLoggerLayer",
        )
        .into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentRequest
where
    S: Send + Sync,
{
    type Rejection = MissingRequestContext;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<RequestContext>>()
            .cloned()
            .map(CurrentRequest)
            .ok_or(MissingRequestContext)
    }
}
