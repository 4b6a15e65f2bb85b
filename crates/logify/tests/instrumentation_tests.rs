//! End-to-end tests for an instrumented router.
//!
//! Requests go through the full layer stack in-process via `oneshot`.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use anyhow::Result;
use axum::body::Body;
use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use logify::testing::{FailingSink, MemorySink};
use logify::{
    ApiStats, CurrentRequest, InternalFailure, Level, Logify, LogifyConfig, LogSink,
    RequestContext, X_REQUEST_ID,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= 1e-6 * expected.abs().max(1.0),
        "expected {expected}, got {actual}"
    );
}

fn orders_app(logify: &Logify) -> Router {
    let handler_logify = logify.clone();
    let router = Router::new()
        .route(
            "/api/orders",
            post(move |CurrentRequest(ctx): CurrentRequest| {
                let logify = handler_logify.clone();
                async move {
                    logify.info(
                        "Creating order",
                        json!({ "requestId": ctx.request_id().to_string(), "items": 2 }),
                    );
                    (StatusCode::CREATED, Json(json!({ "id": "order-1" })))
                }
            }),
        )
        .route(
            "/api/orders/:id",
            get(|| async {
                InternalFailure::new("Order store unavailable", "caused by: lock poisoned")
                    .into_response()
            }),
        );
    logify.instrument(router)
}

async fn send(app: Router, method: Method, uri: &str) -> Result<Response> {
    let request = Request::builder().method(method).uri(uri).body(Body::empty())?;
    Ok(app.oneshot(request).await?)
}

async fn body_json(response: Response) -> Result<Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

fn memory_logify(config: LogifyConfig) -> (Logify, Arc<MemorySink>) {
    let memory = Arc::new(MemorySink::new());
    let logify = Logify::with_sinks(config, vec![memory.clone()]).unwrap();
    (logify, memory)
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[test]
fn test_orders_stats_sequence_with_fixed_latencies() {
    let (logify, memory) = memory_logify(LogifyConfig::new("orders"));

    let created = RequestContext::new(Method::POST, "/api/orders");
    assert!(logify.finalize(&created, StatusCode::CREATED, Duration::from_millis(50)));
    assert_eq!(
        logify.api_stats(),
        ApiStats {
            total_requests: 1,
            successful_requests: 1,
            failed_requests: 0,
            average_response_time_ms: 50.0,
        }
    );

    let failed = RequestContext::new(Method::GET, "/api/orders/1");
    let failure = InternalFailure::new("boom", "trace");
    assert!(logify.finalize_failure(&failed, &failure, Duration::from_millis(10)));

    let stats = logify.api_stats();
    assert_eq!(stats.total_requests, 2);
    assert_eq!(stats.successful_requests, 1);
    assert_eq!(stats.failed_requests, 1);
    assert_close(stats.average_response_time_ms, 30.0);

    assert!(memory.records().iter().all(|r| r.service() == "orders"));
}

#[tokio::test]
async fn test_orders_end_to_end() -> Result<()> {
    let (logify, memory) = memory_logify(LogifyConfig::new("orders"));

    let response = send(orders_app(&logify), Method::POST, "/api/orders").await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let request_id = response
        .headers()
        .get(X_REQUEST_ID)
        .expect("x-request-id header")
        .to_str()?
        .to_string();

    let stats = logify.api_stats();
    assert_eq!(
        (stats.total_requests, stats.successful_requests, stats.failed_requests),
        (1, 1, 0)
    );

    let response = send(orders_app(&logify), Method::GET, "/api/orders/1").await?;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await?;
    assert_eq!(
        body,
        json!({"error": {"code": "INTERNAL_ERROR", "message": "An internal error occurred"}})
    );
    let text = body.to_string();
    assert!(!text.contains("lock poisoned"));
    assert!(!text.contains("Order store unavailable"));

    let stats = logify.api_stats();
    assert_eq!(
        (stats.total_requests, stats.successful_requests, stats.failed_requests),
        (2, 1, 1)
    );

    // Handler record shares the request's correlation id.
    let handler_record = memory.find("Creating order").expect("handler record");
    assert_eq!(handler_record.request_id().map(|id| id.to_string()), Some(request_id));
    assert_eq!(handler_record.field("items"), Some(&json!(2)));

    let messages = memory.messages();
    assert_eq!(
        messages,
        vec![
            "Incoming request",
            "Creating order",
            "Outgoing response",
            "Incoming request",
            "Unhandled error",
        ]
    );
    Ok(())
}

// ============================================================================
// Accounting properties
// ============================================================================

#[tokio::test]
async fn test_many_requests_keep_stats_consistent() -> Result<()> {
    let (logify, _memory) = memory_logify(LogifyConfig::new("orders"));
    let app = orders_app(&logify);

    let mut tasks = Vec::new();
    for i in 0..200 {
        let app = app.clone();
        tasks.push(tokio::spawn(async move {
            let (method, uri) = if i % 4 == 0 {
                (Method::GET, "/api/orders/1")
            } else {
                (Method::POST, "/api/orders")
            };
            send(app, method, uri).await.map(|r| r.status())
        }));
    }

    for task in tasks {
        let status = task.await??;
        assert!(status == StatusCode::CREATED || status == StatusCode::INTERNAL_SERVER_ERROR);
    }

    let stats = logify.api_stats();
    assert_eq!(stats.total_requests, 200);
    assert_eq!(stats.failed_requests, 50);
    assert_eq!(stats.successful_requests, 150);
    assert!(stats.average_response_time_ms >= 0.0);
    Ok(())
}

#[tokio::test]
async fn test_request_ids_are_unique_per_request() -> Result<()> {
    let (logify, memory) = memory_logify(LogifyConfig::new("orders"));
    let app = orders_app(&logify);

    for _ in 0..100 {
        send(app.clone(), Method::POST, "/api/orders").await?;
    }

    let ids: HashSet<_> = memory
        .find_all("Incoming request")
        .iter()
        .filter_map(|r| r.request_id())
        .collect();
    assert_eq!(ids.len(), 100);
    Ok(())
}

// ============================================================================
// Sink failure domains
// ============================================================================

#[tokio::test]
async fn test_failing_remote_sink_never_affects_requests() -> Result<()> {
    let failing = Arc::new(FailingSink::new());
    let memory = Arc::new(MemorySink::new());
    let sinks: Vec<Arc<dyn LogSink>> = vec![memory.clone(), failing.clone()];
    let logify = Logify::with_sinks(LogifyConfig::new("orders"), sinks)?;

    let response = send(orders_app(&logify), Method::POST, "/api/orders").await?;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(logify.api_stats().successful_requests, 1);
    assert_eq!(failing.attempts(), memory.records().len());
    assert!(memory.find("Outgoing response").is_some());
    Ok(())
}

#[tokio::test]
async fn test_remote_backend_outage_with_default_sinks() -> Result<()> {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let logify = Logify::new(
        LogifyConfig::new("orders").with_remote_sink_endpoint(mock_server.uri()),
    )?;

    let response = send(orders_app(&logify), Method::POST, "/api/orders").await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(logify.api_stats().successful_requests, 1);

    // Ingress, handler and egress records are all attempted remotely.
    let mut remote = logify.remote_sink_stats().expect("remote stats");
    for _ in 0..200 {
        if remote.failed == 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        remote = logify.remote_sink_stats().expect("remote stats");
    }
    assert_eq!(remote.failed, 3);
    assert_eq!(remote.delivered, 0);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_remote_backend() -> Result<()> {
    let logify = Logify::new(
        LogifyConfig::new("orders").with_remote_sink_endpoint("http://127.0.0.1:9"),
    )?;

    let response = send(orders_app(&logify), Method::GET, "/api/orders/1").await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(logify.api_stats().failed_requests, 1);
    Ok(())
}

// ============================================================================
// Severity filtering
// ============================================================================

#[tokio::test]
async fn test_minimum_severity_applies_to_every_sink() -> Result<()> {
    let first = Arc::new(MemorySink::new());
    let second = Arc::new(MemorySink::new());
    let sinks: Vec<Arc<dyn LogSink>> = vec![first.clone(), second.clone()];
    let logify = Logify::with_sinks(
        LogifyConfig::new("orders").with_minimum_severity(Level::Error),
        sinks,
    )?;

    send(orders_app(&logify), Method::POST, "/api/orders").await?;
    send(orders_app(&logify), Method::GET, "/api/orders/1").await?;
    logify.warn("Low stock", json!({ "productId": "1" }));

    for sink in [&first, &second] {
        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message(), "Unhandled error");
        assert!(records.iter().all(|r| r.level() >= Level::Error));
    }

    // Filtering never changes accounting.
    assert_eq!(logify.api_stats().total_requests, 2);
    Ok(())
}
