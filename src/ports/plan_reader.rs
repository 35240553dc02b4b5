//! Subscription plan read port.
//!
//! Plans are reference data during activation; this port only reads.

use crate::domain::foundation::{DomainError, PlanId};
use crate::domain::subscription::SubscriptionPlan;
use async_trait::async_trait;

/// Port for reading subscription plans.
#[async_trait]
pub trait PlanReader: Send + Sync {
    /// Find a plan by id.
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<SubscriptionPlan>, DomainError>;
}
