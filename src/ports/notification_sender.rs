//! Notification creation port.
//!
//! Fire-and-forget from the pipeline's perspective: a failed notification
//! is logged and swallowed, never allowed to abort payment processing.

use crate::domain::foundation::{DomainError, UserId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Notification kinds emitted by the payment pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    PaymentSuccess,
    PaymentFailed,
    SubscriptionActivated,
}

/// A notification to create for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: UserId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
}

/// Port for creating user notifications.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Create a notification.
    async fn notify(&self, notification: NewNotification) -> Result<(), DomainError>;
}
