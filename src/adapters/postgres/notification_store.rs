//! PostgreSQL implementation of the notification sender port.
//!
//! Notifications are rows the directory frontend polls; creating one is an
//! insert, delivery is someone else's concern.

use crate::domain::foundation::{DomainError, ErrorCode, NotificationId, Timestamp};
use crate::ports::{NewNotification, NotificationKind, NotificationSender};
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL implementation of the NotificationSender port.
pub struct PostgresNotificationStore {
    pool: PgPool,
}

impl PostgresNotificationStore {
    /// Creates a new store with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn kind_to_string(kind: &NotificationKind) -> &'static str {
    match kind {
        NotificationKind::PaymentSuccess => "PAYMENT_SUCCESS",
        NotificationKind::PaymentFailed => "PAYMENT_FAILED",
        NotificationKind::SubscriptionActivated => "SUBSCRIPTION_ACTIVATED",
    }
}

#[async_trait]
impl NotificationSender for PostgresNotificationStore {
    async fn notify(&self, notification: NewNotification) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, kind, title, message, link, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(NotificationId::new().as_uuid())
        .bind(notification.user_id.as_str())
        .bind(kind_to_string(&notification.kind))
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.link)
        .bind(Timestamp::now().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to create notification: {}", e),
            )
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_strings_match_wire_format() {
        assert_eq!(
            kind_to_string(&NotificationKind::PaymentSuccess),
            "PAYMENT_SUCCESS"
        );
        assert_eq!(
            kind_to_string(&NotificationKind::PaymentFailed),
            "PAYMENT_FAILED"
        );
        assert_eq!(
            kind_to_string(&NotificationKind::SubscriptionActivated),
            "SUBSCRIPTION_ACTIVATED"
        );
    }
}
