//! User service entry point.

use std::sync::Arc;
use user_service::{build_routes, AppState, SERVICE};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::server::run(SERVICE, "user_service", |parts| {
        let state = Arc::new(AppState::new(parts.logify, parts.faults));
        build_routes(state, parts.metrics_handle, parts.request_timeout)
    })
    .await
}
