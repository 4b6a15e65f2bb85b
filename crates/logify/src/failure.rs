//! Internal failures and the sanitized response that replaces them.
//!
//! Handlers (or the panic catcher) describe an internal failure with an
//! [`InternalFailure`]. It travels as a response extension so that the
//! error handler layer is the single place that logs it, accounts for it
//! and strips it. Its message and diagnostic never reach the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::any::Any;
use std::backtrace::Backtrace;

/// Error code in the sanitized body.
pub const INTERNAL_ERROR_CODE: &str = "INTERNAL_ERROR";

/// Message in the sanitized body.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: &'static str,
}

/// Build the generic 500 response. Carries no diagnostic detail.
pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: ErrorDetail {
                code: INTERNAL_ERROR_CODE,
                message: INTERNAL_ERROR_MESSAGE,
            },
        }),
    )
        .into_response()
}

/// Description of an unexpected failure inside a request handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalFailure {
    message: String,
    diagnostic: String,
}

impl InternalFailure {
    pub fn new(message: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            diagnostic: diagnostic.into(),
        }
    }

    /// Build from a caught panic payload.
    ///
    /// The backtrace is captured at the catch site and honours
    /// `RUST_BACKTRACE`.
    pub fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "handler panicked".to_string()
        };

        Self {
            message,
            diagnostic: format!("panic in request handler\n{}", Backtrace::capture()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Trace or error chain for operators.
    pub fn diagnostic(&self) -> &str {
        &self.diagnostic
    }
}

impl IntoResponse for InternalFailure {
    /// The sanitized 500 body, with `self` attached as an extension for the
    /// error handler layer to pick up.
    fn into_response(self) -> Response {
        let mut response = internal_error_response();
        response.extensions_mut().insert(self);
        response
    }
}
