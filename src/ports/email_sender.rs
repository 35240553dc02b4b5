//! Email dispatch port.
//!
//! Fire-and-forget: delivery failures are logged and swallowed by callers.

use crate::domain::foundation::DomainError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An email to send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Port for sending transactional email.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send an email.
    async fn send(&self, message: EmailMessage) -> Result<(), DomainError>;
}
