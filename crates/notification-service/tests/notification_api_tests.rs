//! Notification API integration tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use anyhow::Result;
use axum::body::Body;
use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::Router;
use common::telemetry::detached_metrics_handle;
use common::FaultInjector;
use http_body_util::BodyExt;
use logify::testing::MemorySink;
use logify::{Logify, LogifyConfig};
use notification_service::{build_routes, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app() -> (Router, Logify, Arc<MemorySink>) {
    let memory = Arc::new(MemorySink::new());
    let logify = Logify::with_sinks(
        LogifyConfig::new("notification-service"),
        vec![memory.clone()],
    )
    .unwrap();
    let state = Arc::new(AppState::new(logify.clone(), FaultInjector::disabled()));
    let router = build_routes(state, detached_metrics_handle(), Duration::from_secs(30));
    (router, logify, memory)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))?,
        None => builder.body(Body::empty())?,
    };
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    if bytes.is_empty() {
        return Ok((status, Value::Null));
    }
    Ok((status, serde_json::from_slice(&bytes)?))
}

async fn create(app: &Router, body: Value) -> Result<Value> {
    let (status, created) = send(app, Method::POST, "/api/notifications", Some(body)).await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(created)
}

#[tokio::test]
async fn test_create_defaults_priority() -> Result<()> {
    let (app, _, _) = app();

    let created = create(
        &app,
        json!({"userId": "1", "type": "email", "message": "Welcome aboard"}),
    )
    .await?;

    assert_eq!(created["priority"], "normal");
    assert_eq!(created["status"], "pending");
    assert_eq!(created["sentAt"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn test_missing_message_is_rejected() -> Result<()> {
    let (app, logify, memory) = app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/notifications",
        Some(json!({"userId": "1", "type": "sms"})),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Missing required fields");
    assert!(memory.find("Invalid notification data").is_some());
    assert_eq!(logify.api_stats().failed_requests, 1);
    Ok(())
}

#[tokio::test]
async fn test_user_notifications_are_filtered() -> Result<()> {
    let (app, _, _) = app();
    create(&app, json!({"userId": "1", "type": "email", "message": "a", "priority": "high"})).await?;
    create(&app, json!({"userId": "1", "type": "sms", "message": "b"})).await?;
    create(&app, json!({"userId": "2", "type": "email", "message": "c"})).await?;

    let (_, all) = send(&app, Method::GET, "/api/notifications/user/1", None).await?;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, email) = send(&app, Method::GET, "/api/notifications/user/1?type=email", None).await?;
    let email = email.as_array().unwrap();
    assert_eq!(email.len(), 1);
    assert_eq!(email[0]["priority"], "high");

    let (_, none) = send(
        &app,
        Method::GET,
        "/api/notifications/user/1?status=sent",
        None,
    )
    .await?;
    assert_eq!(none, json!([]));
    Ok(())
}

#[tokio::test]
async fn test_marking_sent_sets_sent_at() -> Result<()> {
    let (app, _, _) = app();
    let created = create(&app, json!({"userId": "1", "type": "push", "message": "Ping"})).await?;
    let uri = format!("/api/notifications/{}/status", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"status": "failed"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentAt"], Value::Null);

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"status": "sent"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "sent");
    assert!(body["sentAt"].is_string());
    Ok(())
}

#[tokio::test]
async fn test_invalid_status_is_checked_before_lookup() -> Result<()> {
    let (app, _, _) = app();

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/api/notifications/unknown/status",
        Some(json!({"status": "read"})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid status");

    let (status, _) = send(
        &app,
        Method::PATCH,
        "/api/notifications/unknown/status",
        Some(json!({"status": "sent"})),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_delete_returns_no_content() -> Result<()> {
    let (app, logify, _) = app();
    let created = create(&app, json!({"userId": "1", "type": "email", "message": "Bye"})).await?;
    let uri = format!("/api/notifications/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // 204 is a success, the repeated delete is not.
    let stats = logify.api_stats();
    assert_eq!(
        (stats.total_requests, stats.successful_requests, stats.failed_requests),
        (3, 2, 1)
    );
    Ok(())
}
