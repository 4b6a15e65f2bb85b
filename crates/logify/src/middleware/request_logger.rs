//! Ingress logging.
//!
//! Tags each request with a [`RequestContext`] and emits one
//! `Incoming request` record before the inner service runs, so ingress
//! always precedes egress for the same request. The generated id is echoed
//! back in the `x-request-id` response header.

use axum::extract::{ConnectInfo, Query, Request};
use axum::http::header::{HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::context::{CorrelationTagger, RequestContext, X_REQUEST_ID};
use crate::instrumentation::Logify;
use crate::record::Fields;

/// Headers copied into the ingress record. Credentials are never included.
pub const LOGGED_HEADERS: &[&str] = &[
    "user-agent",
    "content-type",
    "content-length",
    "accept",
    "referer",
    "x-forwarded-for",
];

#[derive(Clone)]
pub struct RequestLoggerLayer {
    logify: Logify,
}

impl RequestLoggerLayer {
    pub fn new(logify: Logify) -> Self {
        Self { logify }
    }
}

impl<S> Layer<S> for RequestLoggerLayer {
    type Service = RequestLogger<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestLogger {
            inner,
            logify: self.logify.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RequestLogger<S> {
    inner: S,
    logify: Logify,
}

impl<S> Service<Request> for RequestLogger<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        let (context, fresh) = CorrelationTagger::tag(&mut request);
        if fresh {
            self.logify
                .log_ingress(&context, ingress_fields(&context, &request));
        }

        let future = self.inner.call(request);
        Box::pin(async move {
            let mut response = future.await?;
            if let Ok(value) = HeaderValue::from_str(&context.request_id().to_string()) {
                response
                    .headers_mut()
                    .entry(HeaderName::from_static(X_REQUEST_ID))
                    .or_insert(value);
            }
            Ok(response)
        })
    }
}

fn ingress_fields(context: &RequestContext, request: &Request) -> Fields {
    let mut fields = Fields::new();
    fields.insert("method".to_string(), Value::from(context.method().as_str()));
    fields.insert("path".to_string(), Value::from(context.path()));
    fields.insert("query".to_string(), query_fields(request));
    fields.insert(
        "headers".to_string(),
        Value::Object(selected_headers(request.headers())),
    );
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        fields.insert("ip".to_string(), Value::from(addr.ip().to_string()));
    }
    fields
}

/// Query parameters as an object. Unparsable strings are kept verbatim.
fn query_fields(request: &Request) -> Value {
    match Query::<BTreeMap<String, String>>::try_from_uri(request.uri()) {
        Ok(Query(params)) => Value::Object(
            params
                .into_iter()
                .map(|(key, value)| (key, Value::from(value)))
                .collect(),
        ),
        Err(_) => Value::from(request.uri().query().unwrap_or_default()),
    }
}

fn selected_headers(headers: &HeaderMap) -> Map<String, Value> {
    LOGGED_HEADERS
        .iter()
        .filter_map(|name| {
            let value = headers.get(*name)?.to_str().ok()?;
            Some(((*name).to_string(), Value::from(value)))
        })
        .collect()
}
