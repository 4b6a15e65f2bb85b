//! HTTP routes for the notification service.

use crate::handlers;
use crate::models::Notification;
use axum::{
    routing::{delete, get, patch, post},
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
    pub notifications: Store<Notification>,
    pub faults: FaultInjector,
}

impl AppState {
    pub fn new(logify: Logify, faults: FaultInjector) -> Self {
        Self {
            logify,
            notifications: Store::new(),
            faults,
        }
    }
}

/// Build the application routes.
///
/// - `POST /api/notifications` - Create notification
/// - `GET /api/notifications/user/:userId` - Filter by `status`, `type`, `priority`
/// - `PATCH /api/notifications/:id/status` - `pending`, `sent` or `failed`
/// - `DELETE /api/notifications/:id` - Remove (204)
pub fn build_routes(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    let logify = state.logify.clone();

    let api = Router::new()
        .route("/api/notifications", post(handlers::create_notification))
        .route(
            "/api/notifications/user/:user_id",
            get(handlers::list_user_notifications),
        )
        .route(
            "/api/notifications/:id/status",
            patch(handlers::update_status),
        )
        .route(
            "/api/notifications/:id",
            delete(handlers::delete_notification),
        )
        .with_state(state);

    build_service_router(api, &logify, metrics_handle, request_timeout)
}
