//! Payment service models.

use chrono::{DateTime, Utc};
use common::Entity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    /// Set once the payment leaves `Pending` through processing.
    pub processed_at: Option<DateTime<Utc>>,
}

impl Entity for Payment {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub order_id: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub payment_method: Option<String>,
}

/// A complete payment request: every field present, non-empty and a
/// positive amount.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPayment {
    pub order_id: String,
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
}

impl CreatePaymentRequest {
    pub fn validate(self) -> Option<ValidPayment> {
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());
        Some(ValidPayment {
            order_id: present(self.order_id)?,
            amount: self.amount.filter(|a| a.is_finite() && *a > 0.0)?,
            currency: present(self.currency)?,
            payment_method: present(self.payment_method)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> CreatePaymentRequest {
        CreatePaymentRequest {
            order_id: Some("order-1".to_string()),
            amount: Some(49.99),
            currency: Some("PLN".to_string()),
            payment_method: Some("card".to_string()),
        }
    }

    #[test]
    fn test_complete_request_validates() {
        let payment = complete().validate();
        assert_eq!(payment.map(|p| p.currency), Some("PLN".to_string()));
    }

    #[test]
    fn test_each_field_is_required() {
        let missing = [
            CreatePaymentRequest {
                order_id: None,
                ..complete()
            },
            CreatePaymentRequest {
                amount: Some(0.0),
                ..complete()
            },
            CreatePaymentRequest {
                currency: Some(String::new()),
                ..complete()
            },
            CreatePaymentRequest {
                payment_method: None,
                ..complete()
            },
        ];
        for request in missing {
            assert!(request.validate().is_none());
        }
    }
}
