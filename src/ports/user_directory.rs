//! User directory read port.
//!
//! User accounts are owned by the directory's CRUD layer; the pipeline only
//! needs an email address to dispatch receipts and activation summaries.

use crate::domain::foundation::{DomainError, UserId};
use async_trait::async_trait;

/// Port for reading user contact details.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a user's email address.
    async fn email_of(&self, user_id: &UserId) -> Result<Option<String>, DomainError>;
}
