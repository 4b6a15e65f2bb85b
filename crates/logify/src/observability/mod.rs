//! Observability for the instrumentation layer itself.

pub mod metrics;
