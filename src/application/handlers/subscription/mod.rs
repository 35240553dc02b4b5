//! Subscription command handlers.

mod activate_subscription;

pub use activate_subscription::{ActivationOutcome, SubscriptionActivator};
