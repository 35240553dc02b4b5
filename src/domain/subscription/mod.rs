//! Subscription domain - business subscriptions, plans, and entitlements.

mod aggregate;
mod plan;
mod status;

pub use aggregate::BusinessSubscription;
pub use plan::{EntitlementGrant, PlanEntitlements, SubscriptionPlan};
pub use status::SubscriptionStatus;
