//! User service.
//!
//! Keeps user accounts in memory and exposes CRUD, search, status and
//! login endpoints. Every route is instrumented by logify.

pub mod handlers;
pub mod models;
pub mod routes;

pub use routes::{build_routes, AppState};

/// Binary name and default port.
pub const SERVICE: common::ServiceDefaults = common::ServiceDefaults {
    name: "user-service",
    port: 3001,
};
