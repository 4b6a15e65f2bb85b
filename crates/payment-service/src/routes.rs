//! HTTP routes for the payment service.

use crate::handlers;
use crate::models::Payment;
use axum::{
    routing::{get, post},
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
    pub payments: Store<Payment>,
    pub faults: FaultInjector,
}

impl AppState {
    pub fn new(logify: Logify, faults: FaultInjector) -> Self {
        Self {
            logify,
            payments: Store::new(),
            faults,
        }
    }
}

/// Build the application routes.
///
/// - `POST /api/payments` - Create payment
/// - `GET /api/payments/:id` - Fetch payment
/// - `GET /api/payments/order/:orderId` - Payments for an order
/// - `POST /api/payments/:id/cancel` - Cancel a payment that has not completed
pub fn build_routes(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    let logify = state.logify.clone();

    let api = Router::new()
        .route("/api/payments", post(handlers::create_payment))
        .route("/api/payments/:id", get(handlers::get_payment))
        .route(
            "/api/payments/order/:order_id",
            get(handlers::list_order_payments),
        )
        .route("/api/payments/:id/cancel", post(handlers::cancel_payment))
        .with_state(state);

    build_service_router(api, &logify, metrics_handle, request_timeout)
}
