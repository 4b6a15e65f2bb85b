//! Shared scaffolding for the instrumented CRUD services.
//!
//! Every service binary follows the same shape, driven by
//! [`server::run`]: read [`ServiceConfig`] from the environment, install
//! tracing and the Prometheus recorder, build a [`logify::Logify`]
//! instance, mount the domain routes through
//! [`server::build_service_router`] and serve until SIGINT/SIGTERM.

pub mod config;
pub mod error;
pub mod fault;
pub mod server;
pub mod store;
pub mod telemetry;

pub use config::{ServiceConfig, ServiceConfigError, ServiceDefaults};
pub use error::ServiceError;
pub use fault::FaultInjector;
pub use store::{Entity, Store};
