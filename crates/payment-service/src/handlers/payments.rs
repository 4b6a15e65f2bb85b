//! Payment handlers.

use crate::models::{CreatePaymentRequest, Payment, PaymentStatus};
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

const PAYMENT_NOT_FOUND: &str = "Payment not found";

#[instrument(skip_all, name = "payments.create")]
pub async fn create_payment(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), ServiceError> {
    let body = json!(request);
    let Some(valid) = request.validate() else {
        state.logify.warn(
            "Invalid payment data",
            json!({ "requestId": ctx.request_id(), "body": body }),
        );
        return Err(ServiceError::BadRequest(
            "Missing required fields".to_string(),
        ));
    };

    state.faults.internal("create payment")?;

    let payment = state.payments.insert(Payment {
        id: Uuid::new_v4().to_string(),
        order_id: valid.order_id,
        amount: valid.amount,
        currency: valid.currency,
        payment_method: valid.payment_method,
        status: PaymentStatus::Pending,
        created_at: Utc::now(),
        processed_at: None,
    });

    state.logify.info(
        "Payment created",
        json!({ "requestId": ctx.request_id(), "payment": payment }),
    );
    Ok((StatusCode::CREATED, Json(payment)))
}

#[instrument(skip_all, name = "payments.get", fields(payment_id = %id))]
pub async fn get_payment(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(id): Path<String>,
) -> Result<Json<Payment>, ServiceError> {
    let Some(payment) = state.payments.get(&id) else {
        state.logify.warn(
            "Payment not found",
            json!({ "requestId": ctx.request_id(), "id": id }),
        );
        return Err(ServiceError::NotFound(PAYMENT_NOT_FOUND.to_string()));
    };

    state.logify.info(
        "Payment fetched",
        json!({ "requestId": ctx.request_id(), "id": id }),
    );
    Ok(Json(payment))
}

#[instrument(skip_all, name = "payments.list_for_order", fields(order_id = %order_id))]
pub async fn list_order_payments(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(order_id): Path<String>,
) -> Json<Vec<Payment>> {
    let payments = state.payments.filter(|p| p.order_id == order_id);

    state.logify.info(
        "Order payments fetched",
        json!({ "requestId": ctx.request_id(), "orderId": order_id, "count": payments.len() }),
    );
    Json(payments)
}

/// Completed payments cannot be cancelled. Cancelling twice is allowed
/// and leaves the payment cancelled.
#[instrument(skip_all, name = "payments.cancel", fields(payment_id = %id))]
pub async fn cancel_payment(
    State(state): State<Arc<AppState>>,
    CurrentRequest(ctx): CurrentRequest,
    Path(id): Path<String>,
) -> Result<Json<Payment>, ServiceError> {
    let outcome = state.payments.try_update(&id, |payment| {
        if payment.status == PaymentStatus::Completed {
            return Err(());
        }
        Ok(Payment {
            status: PaymentStatus::Cancelled,
            ..payment.clone()
        })
    });

    match outcome {
        None => {
            state.logify.warn(
                "Payment to cancel not found",
                json!({ "requestId": ctx.request_id(), "id": id }),
            );
            Err(ServiceError::NotFound(PAYMENT_NOT_FOUND.to_string()))
        }
        Some(Err(())) => {
            state.logify.warn(
                "Cannot cancel a completed payment",
                json!({ "requestId": ctx.request_id(), "id": id }),
            );
            Err(ServiceError::BadRequest(
                "Cannot cancel a completed payment".to_string(),
            ))
        }
        Some(Ok(payment)) => {
            state.logify.info(
                "Payment cancelled",
                json!({ "requestId": ctx.request_id(), "id": id }),
            );
            Ok(Json(payment))
        }
    }
}
