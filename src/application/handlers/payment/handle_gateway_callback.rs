//! HandleGatewayCallbackHandler - the authoritative status-transition entry
//! point.
//!
//! The gateway's server-to-server callback lands here. The payload's own
//! status field is advisory; trust comes from re-verifying the transaction
//! against the gateway before touching the ledger. Gateways redeliver
//! callbacks on transport failures, so the whole path is idempotent.

use std::sync::Arc;

use crate::domain::foundation::PaymentId;
use crate::domain::payment::{PaymentError, PaymentStatus};
use crate::ports::{PaymentGateway, PaymentRepository};

use super::settle_payment::{PaymentSettlement, SettlementOutcome};

/// Command carrying the callback's identifying fields.
///
/// Both fields arrive from an untrusted payload and may be absent.
#[derive(Debug, Clone)]
pub struct HandleGatewayCallbackCommand {
    /// Gateway transaction reference.
    pub transaction_ref: Option<String>,

    /// Correlation id (= local payment id, the gateway's cart id).
    pub correlation_id: Option<String>,
}

/// Result of callback processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// This delivery settled the payment as Completed.
    Completed { payment_id: PaymentId },

    /// This delivery settled the payment as Failed.
    Failed { payment_id: PaymentId },

    /// The payment was already terminal; redelivery acknowledged.
    AlreadyProcessed { payment_id: PaymentId },

    /// The gateway has not decided yet.
    Pending { payment_id: PaymentId },
}

/// Handler for the gateway's server-to-server callback.
pub struct HandleGatewayCallbackHandler {
    gateway: Arc<dyn PaymentGateway>,
    payments: Arc<dyn PaymentRepository>,
    settlement: Arc<PaymentSettlement>,
}

impl HandleGatewayCallbackHandler {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        payments: Arc<dyn PaymentRepository>,
        settlement: Arc<PaymentSettlement>,
    ) -> Self {
        Self {
            gateway,
            payments,
            settlement,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleGatewayCallbackCommand,
    ) -> Result<CallbackOutcome, PaymentError> {
        let transaction_ref = cmd
            .transaction_ref
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| PaymentError::validation("tran_ref", "missing transaction reference"))?;
        let correlation_id = cmd
            .correlation_id
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| PaymentError::validation("cart_id", "missing correlation id"))?;

        let payment_id: PaymentId = correlation_id
            .parse()
            .map_err(|_| PaymentError::validation("cart_id", "not a valid payment id"))?;

        // The payload status is advisory; ask the gateway what actually
        // happened. Failures here become 5xx so the gateway redelivers.
        let verified = self
            .gateway
            .verify_payment(&transaction_ref)
            .await
            .map_err(|e| PaymentError::gateway_retryable(e.to_string()))?;

        let payment = self
            .payments
            .find_by_id(&payment_id)
            .await
            .map_err(PaymentError::from)?
            .ok_or_else(|| PaymentError::not_found(payment_id))?;

        // Idempotency short-circuit for redelivered callbacks.
        if payment.status == PaymentStatus::Completed {
            tracing::info!(
                payment_id = %payment_id,
                tran_ref = %transaction_ref,
                "Callback redelivered for completed payment"
            );
            return Ok(CallbackOutcome::AlreadyProcessed { payment_id });
        }

        let outcome = self
            .settlement
            .apply(&payment_id, &verified)
            .await
            .map_err(PaymentError::from)?;

        Ok(match outcome {
            SettlementOutcome::Completed { .. } => CallbackOutcome::Completed { payment_id },
            SettlementOutcome::Failed { .. } => CallbackOutcome::Failed { payment_id },
            SettlementOutcome::AlreadySettled { .. } => {
                CallbackOutcome::AlreadyProcessed { payment_id }
            }
            SettlementOutcome::StillPending { .. } => CallbackOutcome::Pending { payment_id },
        })
    }
}
