//! PayTabs wire types.
//!
//! Serde representations of the gateway's hosted-page and transaction-query
//! payloads. Field names follow the gateway's JSON contract.

use serde::{Deserialize, Serialize};

/// Hosted payment page request body.
#[derive(Debug, Clone, Serialize)]
pub struct PageRequest {
    pub profile_id: String,
    pub tran_type: String,
    pub tran_class: String,
    pub cart_id: String,
    pub cart_description: String,
    pub cart_currency: String,
    pub cart_amount: String,
    pub customer_details: CustomerDetails,
    pub callback: String,
    #[serde(rename = "return")]
    pub return_url: String,
}

/// Customer block of the page request.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
}

/// Hosted payment page response.
///
/// Success carries `tran_ref` + `redirect_url`; failure carries `code` +
/// `message` instead.
#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse {
    pub tran_ref: Option<String>,
    pub redirect_url: Option<String>,
    pub code: Option<i64>,
    pub message: Option<String>,
}

/// Transaction query request body.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub profile_id: String,
    pub tran_ref: String,
}

/// Transaction query response.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub tran_ref: Option<String>,
    pub cart_id: Option<String>,
    pub payment_result: Option<PaymentResult>,
    pub code: Option<i64>,
    pub message: Option<String>,
}

/// The gateway's decision block.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentResult {
    pub response_status: String,
    #[serde(default)]
    pub response_code: Option<String>,
    #[serde(default)]
    pub response_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_serializes_return_keyword() {
        let request = PageRequest {
            profile_id: "87654".to_string(),
            tran_type: "sale".to_string(),
            tran_class: "ecom".to_string(),
            cart_id: "cart-1".to_string(),
            cart_description: "subscription".to_string(),
            cart_currency: "SAR".to_string(),
            cart_amount: "100.00".to_string(),
            customer_details: CustomerDetails {
                name: "Owner".to_string(),
                email: "owner@example.com".to_string(),
            },
            callback: "https://api.test/callback".to_string(),
            return_url: "https://api.test/return".to_string(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["return"], "https://api.test/return");
        assert!(json.get("return_url").is_none());
        assert_eq!(json["tran_type"], "sale");
    }

    #[test]
    fn successful_page_response_deserializes() {
        let json = r#"{
            "tran_ref": "TST2208200000123",
            "redirect_url": "https://secure.paytabs.sa/payment/page/ABC"
        }"#;
        let response: PageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.tran_ref.as_deref(), Some("TST2208200000123"));
        assert!(response.code.is_none());
    }

    #[test]
    fn error_page_response_deserializes() {
        let json = r#"{"code": 113, "message": "Invalid profile id"}"#;
        let response: PageResponse = serde_json::from_str(json).unwrap();
        assert!(response.tran_ref.is_none());
        assert_eq!(response.code, Some(113));
        assert_eq!(response.message.as_deref(), Some("Invalid profile id"));
    }

    #[test]
    fn query_response_deserializes_payment_result() {
        let json = r#"{
            "tran_ref": "TST2208200000123",
            "cart_id": "f47ac10b-58cc-4372-a567-0e02b2c3d479",
            "payment_result": {
                "response_status": "A",
                "response_code": "G34129",
                "response_message": "Authorised"
            }
        }"#;
        let response: QueryResponse = serde_json::from_str(json).unwrap();
        let result = response.payment_result.unwrap();
        assert_eq!(result.response_status, "A");
        assert_eq!(result.response_message.as_deref(), Some("Authorised"));
    }

    #[test]
    fn query_response_tolerates_missing_result_block() {
        let json = r#"{"tran_ref": "TST123", "code": 400, "message": "No such transaction"}"#;
        let response: QueryResponse = serde_json::from_str(json).unwrap();
        assert!(response.payment_result.is_none());
        assert_eq!(response.code, Some(400));
    }
}
