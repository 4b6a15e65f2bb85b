//! Order service models.

use chrono::{DateTime, Utc};
use common::Entity;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status of a newly created order.
pub const INITIAL_STATUS: &str = "pending";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    /// Line items as submitted by the caller.
    pub products: Vec<Value>,
    pub total_amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Order {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub user_id: Option<String>,
    #[serde(default)]
    pub products: Vec<Value>,
    pub total_amount: Option<f64>,
}

impl CreateOrderRequest {
    /// The order is storable: it names a user, has at least one line item
    /// and a non-negative total.
    pub fn is_valid(&self) -> bool {
        self.user_id.as_deref().is_some_and(|id| !id.is_empty())
            && !self.products.is_empty()
            && self
                .total_amount
                .is_some_and(|total| total.is_finite() && total >= 0.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}
