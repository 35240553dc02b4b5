//! Payment aggregate entity.
//!
//! A Payment is the ledger row tracking one checkout attempt against the
//! external gateway. Its id doubles as the gateway correlation (cart) id.
//!
//! # Design Decisions
//!
//! - **Money in minor units**: amounts are i64 halalas/cents, never floats
//! - **Monotone status**: Pending -> Completed | Failed, then frozen
//! - **Never deleted**: failed and completed rows stay for reconciliation

use crate::domain::foundation::{
    BusinessId, DomainError, ErrorCode, Money, PaymentId, StateMachine, Timestamp, UserId,
};
use serde::{Deserialize, Serialize};

use super::PaymentStatus;

/// Payment aggregate - one checkout attempt.
///
/// # Invariants
///
/// - `id` is globally unique and is the gateway's cart/order id
/// - `amount` is strictly positive (enforced by [`Money`])
/// - status transitions follow the [`PaymentStatus`] state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier, also the gateway correlation id.
    pub id: PaymentId,

    /// User who initiated the payment.
    pub user_id: UserId,

    /// Business this payment is for.
    pub business_id: BusinessId,

    /// Amount charged.
    pub amount: Money,

    /// Current status in the payment lifecycle.
    pub status: PaymentStatus,

    /// Payment method tag (e.g. "card").
    pub payment_method: String,

    /// Gateway-assigned transaction reference, None until the hosted
    /// page has been created.
    pub transaction_ref: Option<String>,

    /// Human-readable description shown on the hosted page.
    pub description: String,

    /// When the payment was created.
    pub created_at: Timestamp,

    /// When the payment was last updated.
    pub updated_at: Timestamp,
}

impl Payment {
    /// Creates a new pending payment at checkout initiation.
    pub fn create(
        user_id: UserId,
        business_id: BusinessId,
        amount: Money,
        description: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: PaymentId::new(),
            user_id,
            business_id,
            amount,
            status: PaymentStatus::Pending,
            payment_method: "card".to_string(),
            transaction_ref: None,
            description: description.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the payment has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Records the gateway-assigned transaction reference.
    ///
    /// Only valid while the payment is still Pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the payment is already terminal.
    pub fn record_transaction_ref(
        &mut self,
        transaction_ref: impl Into<String>,
    ) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot assign transaction reference to a {:?} payment",
                    self.status
                ),
            ));
        }
        self.transaction_ref = Some(transaction_ref.into());
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Settles the payment into a terminal state.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition from the current status is not
    /// allowed (the payment is already terminal, or the target is Pending).
    pub fn settle(
        &mut self,
        target: PaymentStatus,
        transaction_ref: Option<String>,
    ) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Cannot transition payment from {:?} to {:?}", self.status, target),
            )
        })?;
        if let Some(tran_ref) = transaction_ref {
            self.transaction_ref = Some(tran_ref);
        }
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user_id() -> UserId {
        UserId::new("user-123").unwrap()
    }

    fn sar(amount_minor: i64) -> Money {
        Money::new(amount_minor, "SAR").unwrap()
    }

    fn pending_payment() -> Payment {
        Payment::create(
            test_user_id(),
            BusinessId::new(),
            sar(10_000),
            "Annual subscription",
        )
    }

    #[test]
    fn create_starts_pending_without_transaction_ref() {
        let payment = pending_payment();
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(payment.transaction_ref.is_none());
        assert!(!payment.is_terminal());
    }

    #[test]
    fn record_transaction_ref_on_pending() {
        let mut payment = pending_payment();
        payment.record_transaction_ref("TST2208200000123").unwrap();
        assert_eq!(
            payment.transaction_ref.as_deref(),
            Some("TST2208200000123")
        );
    }

    #[test]
    fn record_transaction_ref_rejected_when_terminal() {
        let mut payment = pending_payment();
        payment.settle(PaymentStatus::Failed, None).unwrap();
        assert!(payment.record_transaction_ref("TST123").is_err());
    }

    #[test]
    fn settle_to_completed_stores_transaction_ref() {
        let mut payment = pending_payment();
        payment
            .settle(PaymentStatus::Completed, Some("TST123".to_string()))
            .unwrap();
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.transaction_ref.as_deref(), Some("TST123"));
        assert!(payment.is_terminal());
    }

    #[test]
    fn settle_preserves_existing_ref_when_none_given() {
        let mut payment = pending_payment();
        payment.record_transaction_ref("TST123").unwrap();
        payment.settle(PaymentStatus::Completed, None).unwrap();
        assert_eq!(payment.transaction_ref.as_deref(), Some("TST123"));
    }

    #[test]
    fn settle_is_rejected_once_terminal() {
        let mut payment = pending_payment();
        payment.settle(PaymentStatus::Completed, None).unwrap();

        let result = payment.settle(PaymentStatus::Failed, None);
        assert!(result.is_err());
        assert_eq!(payment.status, PaymentStatus::Completed);
    }
}
