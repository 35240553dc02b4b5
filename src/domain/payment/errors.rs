//! Payment-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | NotFound | 404 |
//! | ValidationFailed | 400 |
//! | InvalidState | 409 |
//! | Gateway | 502 (callback/verify) / 402 payload on creation |
//! | Infrastructure | 500 |

use crate::domain::foundation::{DomainError, ErrorCode, PaymentId};

/// Payment-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// Payment was not found.
    NotFound(PaymentId),

    /// Request was missing or carried a malformed field.
    ValidationFailed { field: String, message: String },

    /// Invalid state for the requested operation.
    InvalidState { current: String, attempted: String },

    /// The external gateway failed or returned a non-success envelope.
    Gateway { message: String, retryable: bool },

    /// Infrastructure error.
    Infrastructure(String),
}

impl PaymentError {
    pub fn not_found(id: PaymentId) -> Self {
        PaymentError::NotFound(id)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PaymentError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        PaymentError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    /// Gateway failure during callback or verification; the gateway's
    /// retry machinery is expected to redeliver.
    pub fn gateway_retryable(message: impl Into<String>) -> Self {
        PaymentError::Gateway {
            message: message.into(),
            retryable: true,
        }
    }

    /// Gateway failure during synchronous creation; the user must restart
    /// checkout, no automatic retry.
    pub fn gateway_terminal(message: impl Into<String>) -> Self {
        PaymentError::Gateway {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        PaymentError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            PaymentError::NotFound(_) => ErrorCode::PaymentNotFound,
            PaymentError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            PaymentError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            PaymentError::Gateway { .. } => ErrorCode::GatewayError,
            PaymentError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            PaymentError::NotFound(id) => format!("Payment not found: {}", id),
            PaymentError::ValidationFailed { field, message } => {
                format!("Invalid '{}': {}", field, message)
            }
            PaymentError::InvalidState { current, attempted } => {
                format!("Cannot {} payment in {} state", attempted, current)
            }
            PaymentError::Gateway { message, .. } => {
                format!("Payment gateway error: {}", message)
            }
            PaymentError::Infrastructure(message) => message.clone(),
        }
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for PaymentError {}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::PaymentNotFound => {
                // Id is not recoverable from a generic DomainError; keep the message.
                PaymentError::Infrastructure(err.message)
            }
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
                PaymentError::ValidationFailed {
                    field: err
                        .details
                        .get("field")
                        .cloned()
                        .unwrap_or_else(|| "request".to_string()),
                    message: err.message,
                }
            }
            ErrorCode::InvalidStateTransition => PaymentError::InvalidState {
                current: "unknown".to_string(),
                attempted: err.message,
            },
            _ => PaymentError::Infrastructure(err.message),
        }
    }
}
