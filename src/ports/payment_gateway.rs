//! Payment gateway port for the external payment processor.
//!
//! Defines the contract for hosted-payment-page gateways (e.g. PayTabs).
//! The gateway's semantics are a fixed external contract: hosted page
//! creation, server-to-server callback, browser return redirect, and an
//! idempotent transaction-query endpoint.
//!
//! # Design
//!
//! - **Verification is authoritative**: callback payloads are advisory;
//!   `verify_payment` is the source of truth
//! - **Idempotent**: `verify_payment` is safe to call any number of times
//! - **No automatic retry on creation**: a failed hosted-page call means the
//!   user restarts checkout

use crate::domain::foundation::Money;
use crate::domain::payment::PaymentStatus;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for payment gateway integrations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted payment page for the given request.
    ///
    /// Returns the browser redirect URL and the gateway's transaction
    /// reference for the new attempt.
    async fn create_hosted_payment(
        &self,
        request: HostedPaymentRequest,
    ) -> Result<HostedPayment, GatewayError>;

    /// Query the authoritative state of a transaction.
    ///
    /// Idempotent; used by the callback path (defense in depth) and by the
    /// redirect bridge's fallback verification.
    async fn verify_payment(
        &self,
        transaction_ref: &str,
    ) -> Result<GatewayPaymentResult, GatewayError>;
}

/// Request to create a hosted payment page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedPaymentRequest {
    /// Local payment id, passed to the gateway as its cart/order id.
    pub correlation_id: String,

    /// Amount and currency to charge.
    pub amount: Money,

    /// Description shown on the hosted page.
    pub description: String,

    /// Customer details for the hosted page.
    pub customer: CustomerDetails,

    /// Absolute URL for the server-to-server callback.
    pub callback_url: String,

    /// Absolute URL for the browser return redirect.
    pub return_url: String,
}

/// Customer details passed to the hosted page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
}

/// A successfully created hosted payment page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedPayment {
    /// URL the browser is sent to for payment entry.
    pub redirect_url: String,

    /// Gateway-assigned transaction reference.
    pub transaction_ref: String,
}

/// Authoritative result of a transaction query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPaymentResult {
    /// Gateway transaction reference.
    pub transaction_ref: String,

    /// Cart/order id echoed back by the gateway, when present.
    pub correlation_id: Option<String>,

    /// Gateway decision mapped into the local status vocabulary.
    /// Unrecognized gateway codes map to Pending, never Completed.
    pub status: PaymentStatus,

    /// Raw gateway response status code, kept for logging.
    pub response_code: String,

    /// Gateway response message.
    pub message: String,
}

/// Errors from gateway operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    /// Error code for categorization.
    pub code: GatewayErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl GatewayError {
    /// Create a new gateway error.
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::AuthenticationError, message)
    }

    /// Create an invalid-response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }

    /// Create a provider-rejection error.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Rejected, message)
    }
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for GatewayError {}

/// Gateway error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Network connectivity issue or timeout.
    NetworkError,

    /// Credential rejected by the gateway.
    AuthenticationError,

    /// Gateway answered with an unparseable or incomplete payload.
    InvalidResponse,

    /// Gateway explicitly rejected the request.
    Rejected,

    /// Unknown error.
    Unknown,
}

impl GatewayErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayErrorCode::NetworkError)
    }
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GatewayErrorCode::NetworkError => "network_error",
            GatewayErrorCode::AuthenticationError => "authentication_error",
            GatewayErrorCode::InvalidResponse => "invalid_response",
            GatewayErrorCode::Rejected => "rejected",
            GatewayErrorCode::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn network_errors_are_retryable() {
        assert!(GatewayError::network("timeout").retryable);
        assert!(!GatewayError::rejected("profile mismatch").retryable);
        assert!(!GatewayError::authentication("bad server key").retryable);
    }

    #[test]
    fn gateway_error_display() {
        let err = GatewayError::invalid_response("missing redirect_url");
        assert!(err.to_string().contains("invalid_response"));
        assert!(err.to_string().contains("missing redirect_url"));
    }
}
