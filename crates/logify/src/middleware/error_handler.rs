//! Unhandled failure reporting.
//!
//! Two things count as an unhandled failure: a panic while building or
//! polling the handler future, and a response carrying an
//! [`InternalFailure`] extension. Either way the failure is logged with its
//! diagnostic, the request is finalized as failed, and the caller gets the
//! generic 500 body. The extension is always stripped.

use axum::extract::Request;
use axum::response::Response;
use futures::future::{BoxFuture, FutureExt};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::context::{RequestContext, RequestContextExt};
use crate::failure::InternalFailure;
use crate::instrumentation::Logify;

#[derive(Clone)]
pub struct ErrorHandlerLayer {
    logify: Logify,
}

impl ErrorHandlerLayer {
    pub fn new(logify: Logify) -> Self {
        Self { logify }
    }
}

impl<S> Layer<S> for ErrorHandlerLayer {
    type Service = ErrorReporter<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ErrorReporter {
            inner,
            logify: self.logify.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ErrorReporter<S> {
    inner: S,
    logify: Logify,
}

impl<S> Service<Request> for ErrorReporter<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let context: Option<Arc<RequestContext>> = request.request_context().cloned();
        let logify = self.logify.clone();

        let future = match panic::catch_unwind(AssertUnwindSafe(|| self.inner.call(request))) {
            Ok(future) => future,
            Err(payload) => {
                let failure = InternalFailure::from_panic(payload.as_ref());
                return Box::pin(async move { Ok(logify.report_failure(context.as_deref(), &failure)) });
            }
        };

        Box::pin(async move {
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(Ok(mut response)) => match response.extensions_mut().remove::<InternalFailure>() {
                    Some(failure) => Ok(logify.report_failure(context.as_deref(), &failure)),
                    None => Ok(response),
                },
                Ok(Err(err)) => Err(err),
                Err(payload) => {
                    let failure = InternalFailure::from_panic(payload.as_ref());
                    Ok(logify.report_failure(context.as_deref(), &failure))
                }
            }
        })
    }
}
