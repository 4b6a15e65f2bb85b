//! Service error types.
//!
//! Client errors carry their message to the caller. Internal errors never
//! do: they are converted into a [`logify::InternalFailure`], which the
//! error handler layer logs and replaces with the generic 500 body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use logify::InternalFailure;
use serde::Serialize;
use thiserror::Error;

/// Maps to HTTP status codes:
/// - BadRequest: 400 Bad Request
/// - Forbidden: 403 Forbidden
/// - NotFound: 404 Not Found
/// - Internal: 500 Internal Server Error (sanitized)
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, message) = match self {
            ServiceError::BadRequest(reason) => ("BAD_REQUEST", reason),
            ServiceError::Forbidden(reason) => ("FORBIDDEN", reason),
            ServiceError::NotFound(resource) => ("NOT_FOUND", resource),
            ServiceError::Internal(err) => {
                return InternalFailure::new(err.to_string(), format!("{err:?}")).into_response();
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorDetail { code, message },
            }),
        )
            .into_response()
    }
}
