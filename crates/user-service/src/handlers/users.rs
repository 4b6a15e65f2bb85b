//! User handlers.
//!
//! Every handler logs through the service's [`logify::Logify`] with the
//! current request id so its records correlate with the ingress and egress
//! records of the same call.

use crate::models::{
    non_empty, CreateUserRequest, LoginResponse, SearchParams, StatusUpdateRequest,
    UpdateUserRequest, User, UserStatus, DEFAULT_ROLE,
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

const USER_NOT_FOUND: &str = "User not found";

#[instrument(skip_all, name = "users.list")]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
) -> Result<Json<Vec<User>>, ServiceError> {
    state
        .logify
        .info("Fetching all users", json!({ "requestId": ctx.request_id() }));

    state.faults.internal("fetch users")?;

    Ok(Json(state.users.all()))
}

#[instrument(skip_all, name = "users.get", fields(user_id = %id))]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(id): Path<String>,
) -> Result<Json<User>, ServiceError> {
    state.logify.info(
        "Fetching user",
        json!({ "requestId": ctx.request_id(), "userId": id }),
    );

    match state.users.get(&id) {
        Some(user) => Ok(Json(user)),
        None => {
            state.logify.warn(
                "User not found",
                json!({ "requestId": ctx.request_id(), "userId": id }),
            );
            Err(ServiceError::NotFound(USER_NOT_FOUND.to_string()))
        }
    }
}

#[instrument(skip_all, name = "users.search")]
pub async fn search_users(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Query(params): Query<SearchParams>,
) -> Json<Vec<User>> {
    state.logify.info(
        "Searching users",
        json!({
            "requestId": ctx.request_id(),
            "query": params.query,
            "role": params.role,
            "status": params.status,
        }),
    );

    let results = state.users.filter(|user| params.matches(user));

    state.logify.info(
        "Search results",
        json!({ "requestId": ctx.request_id(), "resultCount": results.len() }),
    );
    Json(results)
}

#[instrument(skip_all, name = "users.create")]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ServiceError> {
    state.logify.info(
        "Creating new user",
        json!({
            "requestId": ctx.request_id(),
            "name": request.name,
            "email": request.email,
            "role": request.role,
        }),
    );

    let (Some(name), Some(email)) = (non_empty(&request.name), non_empty(&request.email)) else {
        state.logify.warn(
            "Failed to create user",
            json!({
                "requestId": ctx.request_id(),
                "error": "Validation error",
                "details": "name and email are required",
            }),
        );
        return Err(ServiceError::BadRequest("Invalid user data".to_string()));
    };

    if let Err(err) = state.faults.reject("Invalid user data") {
        state.logify.warn(
            "Failed to create user",
            json!({
                "requestId": ctx.request_id(),
                "error": "Validation error",
                "details": "Email already exists",
            }),
        );
        return Err(err);
    }

    let now = Utc::now();
    let user = state.users.insert(User {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role: non_empty(&request.role).unwrap_or(DEFAULT_ROLE).to_string(),
        status: UserStatus::Active,
        created_at: Some(now),
        updated_at: None,
        last_login: Some(now),
    });

    state.logify.info(
        "User created successfully",
        json!({ "requestId": ctx.request_id(), "userId": user.id }),
    );
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip_all, name = "users.update", fields(user_id = %id))]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<User>, ServiceError> {
    state.logify.info(
        "Updating user",
        json!({ "requestId": ctx.request_id(), "userId": id, "updates": request }),
    );

    let status = match non_empty(&request.status) {
        Some(value) => Some(UserStatus::parse(value).ok_or_else(|| {
            state.logify.warn(
                "Invalid status update",
                json!({ "requestId": ctx.request_id(), "userId": id, "invalidStatus": value }),
            );
            ServiceError::BadRequest("Invalid status".to_string())
        })?),
        None => None,
    };

    let updated = state.users.update(&id, |user| {
        if let Some(name) = non_empty(&request.name) {
            user.name = name.to_string();
        }
        if let Some(email) = non_empty(&request.email) {
            user.email = email.to_string();
        }
        if let Some(role) = non_empty(&request.role) {
            user.role = role.to_string();
        }
        if let Some(status) = status {
            user.status = status;
        }
        user.updated_at = Some(Utc::now());
    });

    let Some(user) = updated else {
        state.logify.warn(
            "User not found for update",
            json!({ "requestId": ctx.request_id(), "userId": id }),
        );
        return Err(ServiceError::NotFound(USER_NOT_FOUND.to_string()));
    };

    state.logify.info(
        "User updated successfully",
        json!({ "requestId": ctx.request_id(), "userId": id }),
    );
    Ok(Json(user))
}

#[instrument(skip_all, name = "users.delete", fields(user_id = %id))]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(id): Path<String>,
) -> Result<Json<User>, ServiceError> {
    state.logify.info(
        "Deleting user",
        json!({ "requestId": ctx.request_id(), "userId": id }),
    );

    let Some(user) = state.users.remove(&id) else {
        state.logify.warn(
            "User not found for deletion",
            json!({ "requestId": ctx.request_id(), "userId": id }),
        );
        return Err(ServiceError::NotFound(USER_NOT_FOUND.to_string()));
    };

    state.logify.info(
        "User deleted successfully",
        json!({ "requestId": ctx.request_id(), "userId": id }),
    );
    Ok(Json(user))
}

/// `PATCH /api/users/:id/status`. An unknown user is reported before an
/// invalid status.
#[instrument(skip_all, name = "users.update_status", fields(user_id = %id))]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<User>, ServiceError> {
    state.logify.info(
        "Updating user status",
        json!({ "requestId": ctx.request_id(), "userId": id, "status": request.status }),
    );

    if state.users.get(&id).is_none() {
        state.logify.warn(
            "User not found for status update",
            json!({ "requestId": ctx.request_id(), "userId": id }),
        );
        return Err(ServiceError::NotFound(USER_NOT_FOUND.to_string()));
    }

    let Some(status) = request.status.as_deref().and_then(UserStatus::parse) else {
        state.logify.warn(
            "Invalid status update",
            json!({
                "requestId": ctx.request_id(),
                "userId": id,
                "invalidStatus": request.status,
            }),
        );
        return Err(ServiceError::BadRequest("Invalid status".to_string()));
    };

    let user = state
        .users
        .update(&id, |user| user.status = status)
        .ok_or_else(|| ServiceError::NotFound(USER_NOT_FOUND.to_string()))?;

    state.logify.info(
        "User status updated successfully",
        json!({ "requestId": ctx.request_id(), "userId": id, "newStatus": status.as_str() }),
    );
    Ok(Json(user))
}

#[instrument(skip_all, name = "users.login", fields(user_id = %id))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(id): Path<String>,
) -> Result<Json<LoginResponse>, ServiceError> {
    state.logify.info(
        "User login attempt",
        json!({ "requestId": ctx.request_id(), "userId": id }),
    );

    let now = Utc::now();
    let outcome = state.users.try_update(&id, |user| {
        if user.status != UserStatus::Active {
            return Err(user.status);
        }
        Ok(User {
            last_login: Some(now),
            ..user.clone()
        })
    });

    match outcome {
        None => {
            state.logify.warn(
                "Login failed - user not found",
                json!({ "requestId": ctx.request_id(), "userId": id }),
            );
            Err(ServiceError::NotFound(USER_NOT_FOUND.to_string()))
        }
        Some(Err(status)) => {
            state.logify.warn(
                "Login failed - user not active",
                json!({ "requestId": ctx.request_id(), "userId": id, "status": status.as_str() }),
            );
            Err(ServiceError::Forbidden(
                "User account is not active".to_string(),
            ))
        }
        Some(Ok(_)) => {
            state.logify.info(
                "User logged in successfully",
                json!({ "requestId": ctx.request_id(), "userId": id, "lastLogin": now }),
            );
            Ok(Json(LoginResponse {
                message: "Login successful".to_string(),
                last_login: now,
            }))
        }
    }
}
