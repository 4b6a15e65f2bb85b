//! Notification service.

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::{build_routes, AppState};

/// Binary name and default port.
pub const SERVICE: common::ServiceDefaults = common::ServiceDefaults {
    name: "notification-service",
    port: 3005,
};
