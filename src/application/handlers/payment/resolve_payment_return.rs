//! ResolvePaymentReturnHandler - bridge hop 2.
//!
//! The browser arrives here after the gateway redirect, usually racing the
//! server-to-server callback for the same payment. The handler waits briefly
//! for the callback to land, then re-verifies with the gateway itself as a
//! fallback. Both paths funnel through the same guarded settlement, so the
//! race always resolves to exactly one transition.
//!
//! This handler never fails: a browser must always end up on one of the
//! success/failed/pending destinations, never an error page.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::PaymentId;
use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::{PaymentGateway, PaymentRepository};

use super::settle_payment::PaymentSettlement;

/// Bounded-wait parameters for the ledger poll.
#[derive(Debug, Clone, Copy)]
pub struct RedirectPollPolicy {
    /// Poll attempts before giving up on the callback.
    pub max_attempts: u32,

    /// Pause between attempts (cooperative, never thread-blocking).
    pub interval: Duration,
}

impl RedirectPollPolicy {
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }
}

impl Default for RedirectPollPolicy {
    fn default() -> Self {
        // ~3 seconds total, matching the gateway's typical callback latency.
        Self {
            max_attempts: 6,
            interval: Duration::from_millis(500),
        }
    }
}

/// Command carrying hop 2's query parameters.
#[derive(Debug, Clone, Default)]
pub struct ResolveReturnCommand {
    pub payment_id: Option<String>,
    pub transaction_ref: Option<String>,

    /// The gateway flagged an error on the return redirect.
    pub error: bool,
}

/// Final browser destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnDestination {
    Success {
        payment_id: String,
        transaction_ref: Option<String>,
    },
    Failed {
        payment_id: Option<String>,
        transaction_ref: Option<String>,
    },
    Pending {
        payment_id: String,
        transaction_ref: Option<String>,
    },
}

/// Handler for the browser-facing redirect hop.
pub struct ResolvePaymentReturnHandler {
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    settlement: Arc<PaymentSettlement>,
    policy: RedirectPollPolicy,
}

impl ResolvePaymentReturnHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        settlement: Arc<PaymentSettlement>,
        policy: RedirectPollPolicy,
    ) -> Self {
        Self {
            payments,
            gateway,
            settlement,
            policy,
        }
    }

    pub async fn handle(&self, cmd: ResolveReturnCommand) -> ReturnDestination {
        let transaction_ref = cmd.transaction_ref.filter(|s| !s.trim().is_empty());

        if cmd.error {
            return ReturnDestination::Failed {
                payment_id: cmd.payment_id,
                transaction_ref,
            };
        }

        let Some(raw_id) = cmd.payment_id.filter(|s| !s.trim().is_empty()) else {
            return ReturnDestination::Failed {
                payment_id: None,
                transaction_ref,
            };
        };

        let Ok(payment_id) = raw_id.parse::<PaymentId>() else {
            return ReturnDestination::Failed {
                payment_id: Some(raw_id),
                transaction_ref,
            };
        };

        let payment = match self.payments.find_by_id(&payment_id).await {
            Ok(Some(payment)) => payment,
            Ok(None) => {
                return ReturnDestination::Failed {
                    payment_id: Some(raw_id),
                    transaction_ref,
                };
            }
            Err(err) => {
                // Worst case for a correlation-bearing request is "pending".
                tracing::warn!(payment_id = %payment_id, error = %err, "Ledger read failed on redirect hop");
                return ReturnDestination::Pending {
                    payment_id: raw_id,
                    transaction_ref,
                };
            }
        };

        if payment.is_terminal() {
            return self.destination_for(&payment);
        }

        let Some(transaction_ref) =
            transaction_ref.or_else(|| payment.transaction_ref.clone())
        else {
            // Nothing to verify against; the callback will have to settle it.
            return ReturnDestination::Pending {
                payment_id: raw_id,
                transaction_ref: None,
            };
        };

        // Give the callback a bounded window to land first.
        if let Some(settled) = self.poll_for_callback(&payment_id).await {
            return self.destination_for(&settled);
        }

        // Callback never arrived (or is delayed); verify directly. The
        // settlement guard makes this safe even if the callback races us.
        match self.gateway.verify_payment(&transaction_ref).await {
            Ok(verified) => match self.settlement.apply(&payment_id, &verified).await {
                Ok(outcome) => self.destination_for(outcome.payment()),
                Err(err) => {
                    tracing::warn!(payment_id = %payment_id, error = %err, "Fallback settlement failed");
                    ReturnDestination::Pending {
                        payment_id: raw_id,
                        transaction_ref: Some(transaction_ref),
                    }
                }
            },
            Err(err) => {
                tracing::warn!(
                    payment_id = %payment_id,
                    tran_ref = %transaction_ref,
                    error = %err,
                    "Fallback verification failed"
                );
                ReturnDestination::Pending {
                    payment_id: raw_id,
                    transaction_ref: Some(transaction_ref),
                }
            }
        }
    }

    /// Polls the ledger until the payment turns terminal or attempts run out.
    async fn poll_for_callback(&self, payment_id: &PaymentId) -> Option<Payment> {
        for _ in 0..self.policy.max_attempts {
            tokio::time::sleep(self.policy.interval).await;
            match self.payments.find_by_id(payment_id).await {
                Ok(Some(payment)) if payment.is_terminal() => return Some(payment),
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!(payment_id = %payment_id, error = %err, "Ledger poll failed");
                    return None;
                }
            }
        }
        None
    }

    fn destination_for(&self, payment: &Payment) -> ReturnDestination {
        let payment_id = payment.id.to_string();
        let transaction_ref = payment.transaction_ref.clone();
        match payment.status {
            PaymentStatus::Completed => ReturnDestination::Success {
                payment_id,
                transaction_ref,
            },
            PaymentStatus::Failed => ReturnDestination::Failed {
                payment_id: Some(payment_id),
                transaction_ref,
            },
            PaymentStatus::Pending => ReturnDestination::Pending {
                payment_id,
                transaction_ref,
            },
        }
    }
}
