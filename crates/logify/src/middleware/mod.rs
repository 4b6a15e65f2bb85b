//! Tower layers that instrument an axum router.
//!
//! # Components
//!
//! - `request_logger` - tags the request and logs ingress (outermost)
//! - `response_logger` - finalizes on response or abort
//! - `error_handler` - turns panics and internal failures into a sanitized
//!   500 (innermost)
//!
//! Layer order matters. [`crate::Logify::instrument`] applies all three
//! correctly.

pub mod error_handler;
pub mod request_logger;
pub mod response_logger;

pub use error_handler::{ErrorHandlerLayer, ErrorReporter};
pub use request_logger::{RequestLogger, RequestLoggerLayer};
pub use response_logger::{ResponseInterceptor, ResponseLoggerLayer};
