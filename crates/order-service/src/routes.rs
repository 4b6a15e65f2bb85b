//! HTTP routes for the order service.

use crate::handlers;
use crate::models::Order;
use axum::{
    routing::{get, post, put},
    Router,
};
use common::server::build_service_router;
use common::{FaultInjector, Store};
use logify::Logify;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all handlers.
pub struct AppState {
    pub logify: Logify,
    pub orders: Store<Order>,
    pub faults: FaultInjector,
}

impl AppState {
    /// Orders start empty.
    pub fn new(logify: Logify, faults: FaultInjector) -> Self {
        Self {
            logify,
            orders: Store::new(),
            faults,
        }
    }
}

/// Build the application routes.
///
/// - `POST /api/orders` - Create order
/// - `GET /api/orders/:id` - Fetch order
/// - `GET /api/orders/user/:userId` - Orders placed by a user
/// - `PUT /api/orders/:id/status` - Replace the order status
pub fn build_routes(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    let logify = state.logify.clone();

    let api = Router::new()
        .route("/api/orders", post(handlers::create_order))
        .route("/api/orders/:id", get(handlers::get_order))
        .route("/api/orders/user/:user_id", get(handlers::list_user_orders))
        .route("/api/orders/:id/status", put(handlers::update_order_status))
        .with_state(state);

    build_service_router(api, &logify, metrics_handle, request_timeout)
}
