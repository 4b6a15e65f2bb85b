//! Product service.
//!
//! In-memory product catalogue with search and stock adjustment.

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::{build_routes, AppState};

/// Binary name and default port.
pub const SERVICE: common::ServiceDefaults = common::ServiceDefaults {
    name: "product-service",
    port: 3002,
};
