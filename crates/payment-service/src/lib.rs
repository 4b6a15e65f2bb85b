//! Payment service.
//!
//! Records payments against orders and lets callers cancel those that
//! have not completed yet.

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::{build_routes, AppState};

/// Binary name and default port.
pub const SERVICE: common::ServiceDefaults = common::ServiceDefaults {
    name: "payment-service",
    port: 3004,
};
