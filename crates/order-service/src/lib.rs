//! Order service.

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::{build_routes, AppState};

/// Binary name and default port.
pub const SERVICE: common::ServiceDefaults = common::ServiceDefaults {
    name: "order-service",
    port: 3003,
};
