//! Business directory entitlement port.
//!
//! The directory's business records live outside this core; the activation
//! step reaches them through this port to snapshot plan entitlements.

use crate::domain::foundation::{BusinessId, DomainError};
use crate::domain::subscription::EntitlementGrant;
use async_trait::async_trait;

/// Port for writing entitlement snapshots onto business records.
#[async_trait]
pub trait BusinessDirectory: Send + Sync {
    /// Apply a plan's entitlement grant to a business.
    ///
    /// The verified flag is monotone: implementations must OR the grant
    /// into the stored value, never clear it.
    async fn apply_entitlements(
        &self,
        business_id: &BusinessId,
        grant: &EntitlementGrant,
    ) -> Result<(), DomainError>;
}
