//! Payment status state machine.
//!
//! A payment moves monotonically from Pending to exactly one terminal
//! state. Terminal states absorb every later delivery of the same result,
//! which is what makes gateway redelivery and the redirect fallback safe.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Payment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Created locally, awaiting the gateway's decision.
    Pending,

    /// Gateway confirmed the charge. Terminal.
    Completed,

    /// Gateway declined, errored, or the hosted page could not be created.
    /// Terminal.
    Failed,
}

impl StateMachine for PaymentStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use PaymentStatus::*;
        matches!((self, target), (Pending, Completed) | (Pending, Failed))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use PaymentStatus::*;
        match self {
            Pending => vec![Completed, Failed],
            Completed => vec![],
            Failed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_complete() {
        let status = PaymentStatus::Pending;
        assert!(status.can_transition_to(&PaymentStatus::Completed));

        let result = status.transition_to(PaymentStatus::Completed);
        assert_eq!(result, Ok(PaymentStatus::Completed));
    }

    #[test]
    fn pending_can_fail() {
        let status = PaymentStatus::Pending;
        assert!(status.can_transition_to(&PaymentStatus::Failed));

        let result = status.transition_to(PaymentStatus::Failed);
        assert_eq!(result, Ok(PaymentStatus::Failed));
    }

    #[test]
    fn completed_is_terminal() {
        let status = PaymentStatus::Completed;
        assert!(status.is_terminal());
        assert!(!status.can_transition_to(&PaymentStatus::Failed));
        assert!(!status.can_transition_to(&PaymentStatus::Pending));
    }

    #[test]
    fn failed_is_terminal() {
        let status = PaymentStatus::Failed;
        assert!(status.is_terminal());
        assert!(!status.can_transition_to(&PaymentStatus::Completed));
        assert!(!status.can_transition_to(&PaymentStatus::Pending));
    }

    #[test]
    fn completed_cannot_be_reapplied() {
        let status = PaymentStatus::Completed;
        assert!(status.transition_to(PaymentStatus::Completed).is_err());
    }

    #[test]
    fn pending_is_not_terminal() {
        assert!(!PaymentStatus::Pending.is_terminal());
    }
}
