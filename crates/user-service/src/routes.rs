//! HTTP routes for the user service.

use crate::handlers;
use crate::models::{seed_users, User};
use axum::{
    routing::{get, patch, post},
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
    pub users: Store<User>,
    pub faults: FaultInjector,
}

impl AppState {
    /// State seeded with the default accounts.
    pub fn new(logify: Logify, faults: FaultInjector) -> Self {
        Self {
            logify,
            users: Store::with_items(seed_users()),
            faults,
        }
    }
}

/// Build the application routes.
///
/// - `GET /api/users` - List users
/// - `GET /api/users/search` - Filter by `query`, `role`, `status`
/// - `POST /api/users` - Create user
/// - `GET|PUT|DELETE /api/users/:id` - Read, update, delete
/// - `PATCH /api/users/:id/status` - Change account status
/// - `POST /api/users/:id/login` - Record a login
///
/// plus the shared `/health`, `/api/stats` and `/metrics`.
pub fn build_routes(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    let logify = state.logify.clone();

    let api = Router::new()
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/users/search", get(handlers::search_users))
        .route(
            "/api/users/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/api/users/:id/status", patch(handlers::update_status))
        .route("/api/users/:id/login", post(handlers::login))
        .with_state(state);

    build_service_router(api, &logify, metrics_handle, request_timeout)
}
