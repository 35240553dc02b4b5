//! HTTP DTOs (Data Transfer Objects) for payment endpoints.
//!
//! These types define the JSON/form shapes of the payment API and the
//! gateway-facing endpoints. Gateway-facing fields accept both snake_case
//! and the gateway's camelCase spellings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::{PageRequest, PaymentFilter};
use crate::domain::foundation::Timestamp;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create a payment and start checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePaymentRequest {
    /// Business the payment is for.
    pub business_id: String,

    /// Amount in minor units (halalas).
    pub amount_minor: i64,

    /// 3-letter currency code; defaults to SAR.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Description shown on the hosted payment page.
    pub description: String,

    /// Customer details for the hosted page.
    pub customer_name: String,
    pub customer_email: String,
}

fn default_currency() -> String {
    "SAR".to_string()
}

/// Server-to-server callback payload.
///
/// Only the identifying fields matter; the status block is advisory and is
/// deliberately ignored in favor of re-verification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackRequest {
    #[serde(default, alias = "tranRef")]
    pub tran_ref: Option<String>,

    #[serde(default, alias = "cartId")]
    pub cart_id: Option<String>,
}

/// Browser return parameters (bridge hop 1), from query or form body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReturnParams {
    #[serde(default, alias = "tranRef")]
    pub tran_ref: Option<String>,

    #[serde(default, alias = "cartId")]
    pub cart_id: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

/// Redirect parameters (bridge hop 2).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RedirectParams {
    #[serde(default, alias = "paymentId")]
    pub payment_id: Option<String>,

    #[serde(default, alias = "tranRef")]
    pub tran_ref: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

/// Listing query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPaymentsParams {
    #[serde(default)]
    pub status: Option<PaymentStatus>,

    #[serde(default)]
    pub from: Option<DateTime<Utc>>,

    #[serde(default)]
    pub to: Option<DateTime<Utc>>,

    #[serde(default)]
    pub limit: Option<u32>,

    #[serde(default)]
    pub offset: Option<u32>,
}

impl ListPaymentsParams {
    /// Splits the parameters into the reader's filter and page types.
    pub fn into_filter_and_page(self) -> (PaymentFilter, PageRequest) {
        let filter = PaymentFilter {
            status: self.status,
            created_after: self.from.map(Timestamp::from_datetime),
            created_before: self.to.map(Timestamp::from_datetime),
        };
        let page = PageRequest::new(self.limit.unwrap_or(20), self.offset.unwrap_or(0));
        (filter, page)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// A payment in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub user_id: String,
    pub business_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: PaymentStatus,
    pub payment_method: String,
    pub transaction_ref: Option<String>,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id.to_string(),
            user_id: payment.user_id.to_string(),
            business_id: payment.business_id.to_string(),
            amount_minor: payment.amount.amount_minor(),
            currency: payment.amount.currency().to_string(),
            status: payment.status,
            payment_method: payment.payment_method,
            transaction_ref: payment.transaction_ref,
            description: payment.description,
            created_at: payment.created_at.as_datetime().to_rfc3339(),
            updated_at: payment.updated_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Response for payment creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePaymentResponse {
    pub payment: PaymentResponse,

    /// Hosted payment page to send the browser to.
    pub redirect_url: String,
}

/// One page of payments.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentListResponse {
    pub items: Vec<PaymentResponse>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

/// Callback acknowledgement body.
#[derive(Debug, Clone, Serialize)]
pub struct CallbackAck {
    pub status: &'static str,
    pub result: String,
}

impl CallbackAck {
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            status: "ok",
            result: result.into(),
        }
    }
}

/// Standard error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{BusinessId, Money, UserId};

    #[test]
    fn callback_request_accepts_camel_case_aliases() {
        let json = r#"{"tranRef": "TST123", "cartId": "cart-1"}"#;
        let request: CallbackRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.tran_ref.as_deref(), Some("TST123"));
        assert_eq!(request.cart_id.as_deref(), Some("cart-1"));
    }

    #[test]
    fn callback_request_accepts_snake_case() {
        let json = r#"{"tran_ref": "TST123", "cart_id": "cart-1"}"#;
        let request: CallbackRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.tran_ref.as_deref(), Some("TST123"));
    }

    #[test]
    fn callback_request_tolerates_missing_fields() {
        let request: CallbackRequest = serde_json::from_str("{}").unwrap();
        assert!(request.tran_ref.is_none());
        assert!(request.cart_id.is_none());
    }

    #[test]
    fn return_params_accept_gateway_spelling() {
        let json = r#"{"tranRef": "TST123", "cartId": "abc", "error": "declined"}"#;
        let params: ReturnParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.tran_ref.as_deref(), Some("TST123"));
        assert_eq!(params.cart_id.as_deref(), Some("abc"));
        assert_eq!(params.error.as_deref(), Some("declined"));
    }

    #[test]
    fn create_request_defaults_currency_to_sar() {
        let json = r#"{
            "business_id": "f47ac10b-58cc-4372-a567-0e02b2c3d479",
            "amount_minor": 10000,
            "description": "subscription",
            "customer_name": "Owner",
            "customer_email": "owner@example.com"
        }"#;
        let request: CreatePaymentRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.currency, "SAR");
    }

    #[test]
    fn list_params_convert_to_filter_and_clamped_page() {
        let params = ListPaymentsParams {
            status: Some(PaymentStatus::Completed),
            limit: Some(500),
            ..Default::default()
        };
        let (filter, page) = params.into_filter_and_page();
        assert_eq!(filter.status, Some(PaymentStatus::Completed));
        assert_eq!(page.limit, 100);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn payment_response_carries_all_fields() {
        let mut payment = Payment::create(
            UserId::new("user-1").unwrap(),
            BusinessId::new(),
            Money::new(10_000, "SAR").unwrap(),
            "subscription",
        );
        payment.record_transaction_ref("TST123").unwrap();

        let response = PaymentResponse::from(payment.clone());
        assert_eq!(response.id, payment.id.to_string());
        assert_eq!(response.amount_minor, 10_000);
        assert_eq!(response.currency, "SAR");
        assert_eq!(response.transaction_ref.as_deref(), Some("TST123"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "pending");
    }
}
