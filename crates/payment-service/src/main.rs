//! Payment service entry point.

use payment_service::{build_routes, AppState, SERVICE};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::server::run(SERVICE, "payment_service", |parts| {
        let state = Arc::new(AppState::new(parts.logify, parts.faults));
        build_routes(state, parts.metrics_handle, parts.request_timeout)
    })
    .await
}
