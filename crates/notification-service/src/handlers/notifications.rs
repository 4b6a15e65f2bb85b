//! Notification handlers.

use crate::models::{
    CreateNotificationRequest, Notification, NotificationFilter, NotificationStatus,
    StatusUpdateRequest, DEFAULT_PRIORITY,
};
use crate::routes::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use common::ServiceError;
use logify::CurrentRequest;
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

const NOTIFICATION_NOT_FOUND: &str = "Notification not found";

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[instrument(skip_all, name = "notifications.create")]
pub async fn create_notification(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Json(request): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), ServiceError> {
    let body = json!(request);
    let CreateNotificationRequest {
        user_id,
        kind,
        message,
        priority,
    } = request;

    let (Some(user_id), Some(kind), Some(message)) =
        (required(user_id), required(kind), required(message))
    else {
        state.logify.warn(
            "Invalid notification data",
            json!({ "requestId": ctx.request_id(), "body": body }),
        );
        return Err(ServiceError::BadRequest(
            "Missing required fields".to_string(),
        ));
    };

    state.faults.internal("create notification")?;

    let notification = state.notifications.insert(Notification {
        id: Uuid::new_v4().to_string(),
        user_id,
        kind,
        message,
        priority: required(priority).unwrap_or_else(|| DEFAULT_PRIORITY.to_string()),
        status: NotificationStatus::Pending,
        created_at: Utc::now(),
        sent_at: None,
    });

    state.logify.info(
        "Notification created",
        json!({ "requestId": ctx.request_id(), "notification": notification }),
    );
    Ok((StatusCode::CREATED, Json(notification)))
}

#[instrument(skip_all, name = "notifications.list_for_user", fields(user_id = %user_id))]
pub async fn list_user_notifications(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(user_id): Path<String>,
    Query(filter): Query<NotificationFilter>,
) -> Json<Vec<Notification>> {
    let notifications = state
        .notifications
        .filter(|n| n.user_id == user_id && filter.matches(n));

    state.logify.info(
        "User notifications fetched",
        json!({
            "requestId": ctx.request_id(),
            "userId": user_id,
            "count": notifications.len(),
        }),
    );
    Json(notifications)
}

/// An invalid status is rejected before the notification is looked up.
#[instrument(skip_all, name = "notifications.update_status", fields(notification_id = %id))]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Notification>, ServiceError> {
    let Some(status) = request.status.as_deref().and_then(NotificationStatus::parse) else {
        state.logify.warn(
            "Invalid notification status",
            json!({ "requestId": ctx.request_id(), "id": id, "status": request.status }),
        );
        return Err(ServiceError::BadRequest("Invalid status".to_string()));
    };

    let updated = state.notifications.update(&id, |notification| {
        notification.status = status;
        if status == NotificationStatus::Sent {
            notification.sent_at = Some(Utc::now());
        }
    });

    let Some(notification) = updated else {
        state.logify.warn(
            "Notification not found",
            json!({ "requestId": ctx.request_id(), "id": id }),
        );
        return Err(ServiceError::NotFound(NOTIFICATION_NOT_FOUND.to_string()));
    };

    state.logify.info(
        "Notification status updated",
        json!({ "requestId": ctx.request_id(), "id": id, "status": status.as_str() }),
    );
    Ok(Json(notification))
}

#[instrument(skip_all, name = "notifications.delete", fields(notification_id = %id))]
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    if state.notifications.remove(&id).is_none() {
        state.logify.warn(
            "Notification to delete not found",
            json!({ "requestId": ctx.request_id(), "id": id }),
        );
        return Err(ServiceError::NotFound(NOTIFICATION_NOT_FOUND.to_string()));
    }

    state.logify.info(
        "Notification deleted",
        json!({ "requestId": ctx.request_id(), "id": id }),
    );
    Ok(StatusCode::NO_CONTENT)
}
