//! Order handlers.

use crate::models::{CreateOrderRequest, Order, StatusUpdateRequest, INITIAL_STATUS};
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
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

const ORDER_NOT_FOUND: &str = "Order not found";
const INVALID_ORDER_DATA: &str = "Invalid order data";

#[instrument(skip_all, name = "orders.create")]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ServiceError> {
    state.logify.info(
        "Creating new order",
        json!({
            "requestId": ctx.request_id(),
            "userId": request.user_id,
            "products": request.products,
            "totalAmount": request.total_amount,
        }),
    );

    let checked = if request.is_valid() {
        state.faults.reject(INVALID_ORDER_DATA)
    } else {
        Err(ServiceError::BadRequest(INVALID_ORDER_DATA.to_string()))
    };
    if let Err(err) = checked {
        state.logify.warn(
            "Failed to create order",
            json!({ "requestId": ctx.request_id(), "error": INVALID_ORDER_DATA }),
        );
        return Err(err);
    }

    let CreateOrderRequest {
        user_id,
        products,
        total_amount,
    } = request;
    let order = state.orders.insert(Order {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.unwrap_or_default(),
        products,
        total_amount: total_amount.unwrap_or_default(),
        status: INITIAL_STATUS.to_string(),
        created_at: Utc::now(),
        updated_at: None,
    });

    state.logify.info(
        "Order created successfully",
        json!({ "requestId": ctx.request_id(), "orderId": order.id }),
    );
    Ok((StatusCode::CREATED, Json(order)))
}

#[instrument(skip_all, name = "orders.get", fields(order_id = %id))]
pub async fn get_order(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(id): Path<String>,
) -> Result<Json<Order>, ServiceError> {
    state.logify.info(
        "Fetching order",
        json!({ "requestId": ctx.request_id(), "orderId": id }),
    );

    match state.orders.get(&id) {
        Some(order) => Ok(Json(order)),
        None => {
            state.logify.warn(
                "Order not found",
                json!({ "requestId": ctx.request_id(), "orderId": id }),
            );
            Err(ServiceError::NotFound(ORDER_NOT_FOUND.to_string()))
        }
    }
}

/// Orders for a user, oldest first. An unknown user has no orders.
#[instrument(skip_all, name = "orders.list_for_user", fields(user_id = %user_id))]
pub async fn list_user_orders(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Order>>, ServiceError> {
    state.logify.info(
        "Fetching user orders",
        json!({ "requestId": ctx.request_id(), "userId": user_id }),
    );

    state.faults.internal("fetch user orders")?;

    Ok(Json(state.orders.filter(|order| order.user_id == user_id)))
}

#[instrument(skip_all, name = "orders.update_status", fields(order_id = %id))]
pub async fn update_order_status(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Order>, ServiceError> {
    state.logify.info(
        "Updating order status",
        json!({ "requestId": ctx.request_id(), "orderId": id, "status": request.status }),
    );

    let Some(status) = request.status.filter(|s| !s.is_empty()) else {
        return Err(ServiceError::BadRequest("status is required".to_string()));
    };

    let updated = state.orders.update(&id, |order| {
        order.status = status.clone();
        order.updated_at = Some(Utc::now());
    });

    let Some(order) = updated else {
        state.logify.warn(
            "Order not found",
            json!({ "requestId": ctx.request_id(), "orderId": id }),
        );
        return Err(ServiceError::NotFound(ORDER_NOT_FOUND.to_string()));
    };

    state.logify.info(
        "Order status updated successfully",
        json!({ "requestId": ctx.request_id(), "orderId": id, "newStatus": status }),
    );
    Ok(Json(order))
}
