//! Service bootstrap, router assembly and the serve loop.

use crate::config::{ServiceConfig, ServiceDefaults};
use crate::fault::FaultInjector;
use crate::telemetry::{default_filter, init_metrics_recorder, init_tracing};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use logify::{ApiStats, CurrentRequest, Logify};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info};

/// What a service needs from the bootstrap to build its router.
pub struct ServiceParts {
    pub logify: Logify,
    pub faults: FaultInjector,
    pub metrics_handle: PrometheusHandle,
    pub request_timeout: Duration,
}

/// Run a service binary to completion.
///
/// Installs tracing (filter default derived from `crate_target`) and the
/// Prometheus recorder, loads [`ServiceConfig`], builds the [`Logify`]
/// instance, hands everything to `build` and serves the resulting router
/// until shutdown. Startup failures are logged before being returned.
pub async fn run<F>(
    defaults: ServiceDefaults,
    crate_target: &str,
    build: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(ServiceParts) -> Router,
{
    init_tracing(&default_filter(crate_target));

    info!(service = defaults.name, "Starting service");

    let config = ServiceConfig::from_env(defaults).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        service_name = %config.logify.service_name,
        bind_address = %config.bind_address,
        remote_sink = %config.logify.remote_sink_endpoint,
        index_namespace = %config.logify.index_namespace,
        minimum_severity = %config.logify.minimum_severity,
        failure_rate = config.failure_rate,
        "Configuration loaded successfully"
    );

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    let logify = Logify::new(config.logify.clone()).map_err(|e| {
        error!("Failed to initialize logify: {}", e);
        e
    })?;

    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    let app = build(ServiceParts {
        logify: logify.clone(),
        faults: FaultInjector::new(config.failure_rate),
        metrics_handle,
        request_timeout: config.request_timeout(),
    });

    logify.info(
        format!("{} listening on port {}", defaults.name, addr.port()),
        serde_json::Value::Null,
    );
    serve(app, addr).await?;

    info!(service = defaults.name, "Shutdown complete");
    Ok(())
}

/// Mount the operational endpoints next to `api` and wrap everything in
/// the instrumentation layers.
///
/// - `/health` - liveness, plain `OK`
/// - `/api/stats` - the service's [`ApiStats`]
/// - `/metrics` - Prometheus exposition
///
/// Layer order (outermost first): request logger, response logger, error
/// handler, CORS, timeout, trace. A timed-out request therefore still
/// reaches the response logger with its 408. CORS is permissive, so
/// browser preflights are answered and logged like any other request.
pub fn build_service_router(
    api: Router,
    logify: &Logify,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    let stats_routes = Router::new()
        .route("/api/stats", get(stats_handler))
        .with_state(logify.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    let router = Router::new()
        .route("/health", get(health_handler))
        .merge(stats_routes)
        .merge(metrics_routes)
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive());

    logify.instrument(router)
}

async fn health_handler() -> &'static str {
    "OK"
}

#[tracing::instrument(skip_all, name = "common.stats")]
async fn stats_handler(
    State(logify): State<Logify>,
    CurrentRequest(ctx): CurrentRequest,
) -> Json<ApiStats> {
    logify.info(
        "Fetching API stats",
        json!({ "requestId": ctx.request_id().to_string() }),
    );
    Json(logify.api_stats())
}

#[tracing::instrument(skip_all, name = "common.metrics.scrape")]
async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}

/// Bind `addr` and serve `app` until SIGINT or SIGTERM.
pub async fn serve(app: Router, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(target: "common.server", %addr, "Listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::telemetry::detached_metrics_handle;
    use axum::body::Body;
    use axum::extract::Request;
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use logify::testing::MemorySink;
    use logify::LogifyConfig;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(timeout: Duration) -> (Router, Logify, Arc<MemorySink>) {
        let memory = Arc::new(MemorySink::new());
        let logify =
            Logify::with_sinks(LogifyConfig::new("widgets"), vec![memory.clone()]).unwrap();
        let api = Router::new()
            .route("/api/widgets", get(|| async { StatusCode::OK }))
            .route(
                "/api/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    StatusCode::OK
                }),
            );
        let router = build_service_router(api, &logify, detached_metrics_handle(), timeout);
        (router, logify, memory)
    }

    async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _, _) = app(Duration::from_secs(30));
        assert_eq!(get_text(app, "/health").await, (StatusCode::OK, "OK".to_string()));
    }

    #[tokio::test]
    async fn test_stats_endpoint_reports_prior_requests() {
        let (app, _, memory) = app(Duration::from_secs(30));

        get_text(app.clone(), "/api/widgets").await;
        let (status, body) = get_text(app, "/api/stats").await;

        assert_eq!(status, StatusCode::OK);
        let stats: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(stats["totalRequests"], 1);
        assert_eq!(stats["successfulRequests"], 1);
        assert_eq!(stats["failedRequests"], 0);
        assert!(memory.find("Fetching API stats").is_some());
    }

    #[tokio::test]
    async fn test_timeout_is_accounted_as_failure() {
        let (app, logify, memory) = app(Duration::from_millis(20));

        let (status, _) = get_text(app, "/api/slow").await;

        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(logify.api_stats().failed_requests, 1);
        let egress = memory.find("Outgoing response").unwrap();
        assert_eq!(egress.field("statusCode"), Some(&serde_json::json!(408)));
    }

    #[tokio::test]
    async fn test_cross_origin_requests_are_allowed() {
        let (app, logify, _) = app(Duration::from_secs(30));

        let preflight = Request::builder()
            .method("OPTIONS")
            .uri("/api/widgets")
            .header("origin", "http://dashboard.local")
            .header("access-control-request-method", "GET")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(preflight).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );

        let request = Request::builder()
            .uri("/api/widgets")
            .header("origin", "http://dashboard.local")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );

        assert_eq!(logify.api_stats().successful_requests, 2);
    }

    #[tokio::test]
    async fn test_metrics_endpoint_is_served() {
        let (app, _, _) = app(Duration::from_secs(30));
        let (status, _) = get_text(app, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
    }
}
