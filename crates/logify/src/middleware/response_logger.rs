//! Egress logging and accounting.
//!
//! Wraps the inner response future. When it resolves, the request is
//! finalized with the response status; if it is dropped first (client went
//! away, timeout above this layer), a guard finalizes it as aborted. The
//! context's completion flag makes both paths, and the error handler,
//! mutually exclusive.

use axum::extract::Request;
use axum::response::Response;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::context::{CorrelationTagger, RequestContext};
use crate::instrumentation::Logify;

#[derive(Clone)]
pub struct ResponseLoggerLayer {
    logify: Logify,
}

impl ResponseLoggerLayer {
    pub fn new(logify: Logify) -> Self {
        Self { logify }
    }
}

impl<S> Layer<S> for ResponseLoggerLayer {
    type Service = ResponseInterceptor<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ResponseInterceptor {
            inner,
            logify: self.logify.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ResponseInterceptor<S> {
    inner: S,
    logify: Logify,
}

impl<S> Service<Request> for ResponseInterceptor<S>
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
        // Normally a no-op: the request logger has already tagged it.
        let (context, _) = CorrelationTagger::tag(&mut request);
        let guard = CompletionGuard {
            logify: self.logify.clone(),
            context: Arc::clone(&context),
        };

        let future = self.inner.call(request);
        Box::pin(async move {
            let response = future.await?;
            guard
                .logify
                .finalize(&context, response.status(), context.elapsed());
            Ok(response)
        })
    }
}

/// Finalizes the request as aborted if it is dropped before the response
/// was observed. Dropping after finalization is a no-op.
struct CompletionGuard {
    logify: Logify,
    context: Arc<RequestContext>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if !self.context.is_completed() {
            self.logify.abort(&self.context);
        }
    }
}
