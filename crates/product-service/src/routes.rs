//! HTTP routes for the product service.

use crate::handlers;
use crate::models::{seed_products, Product};
use axum::{
    routing::{get, patch},
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
    pub products: Store<Product>,
    pub faults: FaultInjector,
}

impl AppState {
    pub fn new(logify: Logify, faults: FaultInjector) -> Self {
        Self {
            logify,
            products: Store::with_items(seed_products()),
            faults,
        }
    }
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/api/products` - List (GET) and create (POST)
/// - `/api/products/search` - Filter by `query`, `category`, `minPrice`, `maxPrice`
/// - `/api/products/:id` - Read, update, delete
/// - `/api/products/:id/stock` - Apply a signed stock delta
pub fn build_routes(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    let logify = state.logify.clone();

    let api = Router::new()
        .route(
            "/api/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/api/products/search", get(handlers::search_products))
        .route(
            "/api/products/:id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/api/products/:id/stock", patch(handlers::adjust_stock))
        .with_state(state);

    build_service_router(api, &logify, metrics_handle, request_timeout)
}
