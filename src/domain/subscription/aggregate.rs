//! BusinessSubscription aggregate entity.
//!
//! A subscription is created Pending when a business owner initiates a
//! purchase, and is bound to its funding payment only later, through the
//! business id and recency. Activation is driven exclusively by the payment
//! pipeline.

use crate::domain::foundation::{
    BusinessId, DomainError, ErrorCode, PlanId, StateMachine, SubscriptionId, Timestamp,
};
use serde::{Deserialize, Serialize};

use super::SubscriptionStatus;

/// Business subscription aggregate.
///
/// # Invariants
///
/// - Status transitions follow the [`SubscriptionStatus`] state machine
/// - `payment_ref`/`payment_provider` are recorded exactly once, at activation
/// - Period dates satisfy `starts_at <= ends_at` once active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessSubscription {
    /// Unique identifier.
    pub id: SubscriptionId,

    /// Business this subscription belongs to.
    pub business_id: BusinessId,

    /// The purchased plan.
    pub plan_id: PlanId,

    /// Current lifecycle status.
    pub status: SubscriptionStatus,

    /// Period start, set at activation.
    pub starts_at: Option<Timestamp>,

    /// Period end, set at activation.
    pub ends_at: Option<Timestamp>,

    /// Gateway transaction reference of the funding payment.
    pub payment_ref: Option<String>,

    /// Payment provider tag (e.g. "paytabs").
    pub payment_provider: Option<String>,

    /// When the subscription was created.
    pub created_at: Timestamp,

    /// When the subscription was last updated.
    pub updated_at: Timestamp,
}

impl BusinessSubscription {
    /// Creates a new pending subscription at purchase initiation.
    pub fn create(business_id: BusinessId, plan_id: PlanId) -> Self {
        let now = Timestamp::now();
        Self {
            id: SubscriptionId::new(),
            business_id,
            plan_id,
            status: SubscriptionStatus::Pending,
            starts_at: None,
            ends_at: None,
            payment_ref: None,
            payment_provider: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Activates this subscription after its funding payment completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription is not Pending.
    pub fn activate(
        &mut self,
        starts_at: Timestamp,
        ends_at: Timestamp,
        payment_ref: impl Into<String>,
        payment_provider: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Active)?;
        self.starts_at = Some(starts_at);
        self.ends_at = Some(ends_at);
        self.payment_ref = Some(payment_ref.into());
        self.payment_provider = Some(payment_provider.into());
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Marks this subscription failed after its funding payment failed.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription is not Pending.
    pub fn mark_failed(&mut self) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Failed)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Cancels this subscription.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Cancelled)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Expires this subscription (external sweep).
    pub fn expire(&mut self) -> Result<(), DomainError> {
        self.transition_to(SubscriptionStatus::Expired)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    fn transition_to(&mut self, target: SubscriptionStatus) -> Result<(), DomainError> {
        self.status = self.status.transition_to(target).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Cannot transition subscription from {:?} to {:?}",
                    self.status, target
                ),
            )
        })?;
        Ok(())
    }
}
