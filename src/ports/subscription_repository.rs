//! Business subscription persistence port.

use crate::domain::foundation::{BusinessId, DomainError, SubscriptionId};
use crate::domain::subscription::BusinessSubscription;
use async_trait::async_trait;

/// Port for business subscription persistence.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Persist a newly created subscription.
    async fn save(&self, subscription: &BusinessSubscription) -> Result<(), DomainError>;

    /// Update an existing subscription.
    async fn update(&self, subscription: &BusinessSubscription) -> Result<(), DomainError>;

    /// Find a subscription by id.
    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<BusinessSubscription>, DomainError>;

    /// Find the most recently created Pending subscription for a business.
    ///
    /// This is the late-binding lookup correlating a completed payment to
    /// the subscription it funds. Two concurrent Pending rows for one
    /// business are not defended against; the newest wins.
    async fn find_latest_pending_by_business(
        &self,
        business_id: &BusinessId,
    ) -> Result<Option<BusinessSubscription>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn SubscriptionRepository) {}
    }
}
