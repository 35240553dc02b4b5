//! Subscription status state machine.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Business subscription lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Created at purchase initiation, awaiting payment completion.
    Pending,

    /// Payment completed; entitlements applied to the business.
    Active,

    /// The funding payment failed.
    Failed,

    /// Cancelled before or during the active period.
    Cancelled,

    /// Period ended (driven by the external expiry sweep).
    Expired,
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            // From PENDING: settled by the payment pipeline
            (Pending, Active)
                | (Pending, Failed)
                | (Pending, Cancelled)
            // From ACTIVE: cancellation or the expiry sweep
                | (Active, Cancelled)
                | (Active, Expired)
            // From CANCELLED
                | (Cancelled, Expired)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Pending => vec![Active, Failed, Cancelled],
            Active => vec![Cancelled, Expired],
            Cancelled => vec![Expired],
            Failed => vec![],
            Expired => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_activate() {
        let status = SubscriptionStatus::Pending;
        assert_eq!(
            status.transition_to(SubscriptionStatus::Active),
            Ok(SubscriptionStatus::Active)
        );
    }

    #[test]
    fn pending_can_fail() {
        let status = SubscriptionStatus::Pending;
        assert_eq!(
            status.transition_to(SubscriptionStatus::Failed),
            Ok(SubscriptionStatus::Failed)
        );
    }

    #[test]
    fn active_cannot_activate_again() {
        let status = SubscriptionStatus::Active;
        assert!(status.transition_to(SubscriptionStatus::Active).is_err());
    }

    #[test]
    fn failed_is_terminal() {
        assert!(SubscriptionStatus::Failed.is_terminal());
    }

    #[test]
    fn expired_is_terminal() {
        assert!(SubscriptionStatus::Expired.is_terminal());
    }

    #[test]
    fn active_can_expire() {
        let status = SubscriptionStatus::Active;
        assert_eq!(
            status.transition_to(SubscriptionStatus::Expired),
            Ok(SubscriptionStatus::Expired)
        );
    }

    #[test]
    fn failed_cannot_recover_to_active() {
        assert!(SubscriptionStatus::Failed
            .transition_to(SubscriptionStatus::Active)
            .is_err());
    }
}
