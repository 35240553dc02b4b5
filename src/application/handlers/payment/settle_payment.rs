//! PaymentSettlement - the single convergence point for payment results.
//!
//! Both the gateway callback and the redirect bridge's fallback verification
//! end up here. The ledger's guarded transition decides which caller is
//! first; only that caller fires notifications, email, and the subscription
//! activator. Everyone else observes the already-terminal row and does
//! nothing.

use std::sync::Arc;

use crate::application::handlers::subscription::SubscriptionActivator;
use crate::domain::foundation::{DomainError, PaymentId};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::{
    EmailMessage, EmailSender, GatewayPaymentResult, NewNotification, NotificationKind,
    NotificationSender, PaymentRepository, UserDirectory,
};

/// Outcome of applying a verified gateway result to the ledger.
#[derive(Debug, Clone)]
pub enum SettlementOutcome {
    /// This call performed the transition into Completed.
    Completed { payment: Payment },

    /// This call performed the transition into Failed.
    Failed { payment: Payment },

    /// The payment was already terminal; nothing changed.
    AlreadySettled { payment: Payment },

    /// The gateway has not decided yet; the payment stays Pending.
    StillPending { payment: Payment },
}

impl SettlementOutcome {
    /// The payment row after settlement.
    pub fn payment(&self) -> &Payment {
        match self {
            SettlementOutcome::Completed { payment }
            | SettlementOutcome::Failed { payment }
            | SettlementOutcome::AlreadySettled { payment }
            | SettlementOutcome::StillPending { payment } => payment,
        }
    }
}

/// Applies verified gateway results to the ledger with exactly-once
/// side effects.
pub struct PaymentSettlement {
    payments: Arc<dyn PaymentRepository>,
    activator: Arc<SubscriptionActivator>,
    notifications: Arc<dyn NotificationSender>,
    users: Arc<dyn UserDirectory>,
    email: Arc<dyn EmailSender>,
}

impl PaymentSettlement {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        activator: Arc<SubscriptionActivator>,
        notifications: Arc<dyn NotificationSender>,
        users: Arc<dyn UserDirectory>,
        email: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            payments,
            activator,
            notifications,
            users,
            email,
        }
    }

    /// Apply a verified gateway result to the payment.
    ///
    /// The transition itself may fail (storage error) and is surfaced to the
    /// caller; every side effect after a committed transition is logged and
    /// swallowed.
    pub async fn apply(
        &self,
        payment_id: &PaymentId,
        verified: &GatewayPaymentResult,
    ) -> Result<SettlementOutcome, DomainError> {
        if verified.status == PaymentStatus::Pending {
            let payment = self.require_payment(payment_id).await?;
            return Ok(SettlementOutcome::StillPending { payment });
        }

        let outcome = self
            .payments
            .transition(payment_id, verified.status, Some(&verified.transaction_ref))
            .await?;

        if !outcome.changed {
            tracing::debug!(
                payment_id = %payment_id,
                status = ?outcome.payment.status,
                "Payment already terminal, skipping side effects"
            );
            return Ok(SettlementOutcome::AlreadySettled {
                payment: outcome.payment,
            });
        }

        let payment = outcome.payment;
        match verified.status {
            PaymentStatus::Completed => {
                self.fire_completed_side_effects(&payment).await;
                Ok(SettlementOutcome::Completed { payment })
            }
            PaymentStatus::Failed => {
                self.fire_failed_side_effects(&payment).await;
                Ok(SettlementOutcome::Failed { payment })
            }
            PaymentStatus::Pending => unreachable!("pending handled above"),
        }
    }

    async fn fire_completed_side_effects(&self, payment: &Payment) {
        let notification = NewNotification {
            user_id: payment.user_id.clone(),
            kind: NotificationKind::PaymentSuccess,
            title: "Payment received".to_string(),
            message: format!("Your payment of {} was received", payment.amount),
            link: Some(format!("/payments/{}", payment.id)),
        };
        if let Err(err) = self.notifications.notify(notification).await {
            tracing::warn!(payment_id = %payment.id, error = %err, "Failed to create payment-success notification");
        }

        self.send_receipt_email(payment).await;

        if let Err(err) = self.activator.on_payment_completed(payment).await {
            tracing::error!(
                payment_id = %payment.id,
                business_id = %payment.business_id,
                error = %err,
                "Subscription activation failed after completed payment"
            );
        }
    }

    async fn fire_failed_side_effects(&self, payment: &Payment) {
        let notification = NewNotification {
            user_id: payment.user_id.clone(),
            kind: NotificationKind::PaymentFailed,
            title: "Payment failed".to_string(),
            message: format!("Your payment of {} was not completed", payment.amount),
            link: Some(format!("/payments/{}", payment.id)),
        };
        if let Err(err) = self.notifications.notify(notification).await {
            tracing::warn!(payment_id = %payment.id, error = %err, "Failed to create payment-failed notification");
        }

        if let Err(err) = self.activator.on_payment_failed(payment).await {
            tracing::error!(
                payment_id = %payment.id,
                business_id = %payment.business_id,
                error = %err,
                "Failed to mark pending subscription failed"
            );
        }
    }

    async fn send_receipt_email(&self, payment: &Payment) {
        let to = match self.users.email_of(&payment.user_id).await {
            Ok(Some(email)) => email,
            Ok(None) => return,
            Err(err) => {
                tracing::warn!(user_id = %payment.user_id, error = %err, "Email lookup failed");
                return;
            }
        };

        let message = EmailMessage {
            to,
            subject: "Payment confirmation".to_string(),
            html_body: format!(
                "<h1>Payment received</h1>\
                 <p>Amount: <strong>{}</strong></p>\
                 <p>Reference: {}</p>\
                 <p>{}</p>",
                payment.amount,
                payment.transaction_ref.as_deref().unwrap_or("-"),
                payment.description
            ),
        };

        if let Err(err) = self.email.send(message).await {
            tracing::warn!(payment_id = %payment.id, error = %err, "Failed to send receipt email");
        }
    }

    async fn require_payment(&self, payment_id: &PaymentId) -> Result<Payment, DomainError> {
        self.payments.find_by_id(payment_id).await?.ok_or_else(|| {
            DomainError::new(
                crate::domain::foundation::ErrorCode::PaymentNotFound,
                format!("Payment not found: {}", payment_id),
            )
        })
    }
}
