//! Payment ledger write port.
//!
//! The ledger owns every mutation of payment rows. The one interesting
//! operation is `transition`: a storage-level compare-and-set that moves a
//! Pending row into a terminal state at most once, no matter how many
//! writers race for it (gateway callback, redirect fallback, redelivery).

use crate::domain::foundation::{DomainError, PaymentId};
use crate::domain::payment::{Payment, PaymentStatus};
use async_trait::async_trait;

/// Result of a guarded status transition.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// The payment row after the call.
    pub payment: Payment,

    /// True when this call performed the Pending -> terminal write.
    /// False when the row was already terminal and nothing changed.
    pub changed: bool,
}

/// Port for payment ledger writes.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Persist a newly created payment (always Pending).
    async fn save(&self, payment: &Payment) -> Result<(), DomainError>;

    /// Record the gateway transaction reference on a still-Pending payment.
    async fn record_transaction_ref(
        &self,
        id: &PaymentId,
        transaction_ref: &str,
    ) -> Result<(), DomainError>;

    /// Guarded transition into a terminal state.
    ///
    /// Must be implemented as an atomic conditional write (the terminal
    /// check and the update are one storage operation, not read-then-write).
    /// When the payment is already terminal the stored row is returned
    /// unchanged with `changed = false`.
    async fn transition(
        &self,
        id: &PaymentId,
        new_status: PaymentStatus,
        transaction_ref: Option<&str>,
    ) -> Result<TransitionOutcome, DomainError>;

    /// Find a payment by id.
    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn PaymentRepository) {}
    }
}
