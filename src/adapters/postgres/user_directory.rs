//! PostgreSQL implementation of the user directory read port.

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::UserDirectory;
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL implementation of the UserDirectory port.
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a new directory with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn email_of(&self, user_id: &UserId) -> Result<Option<String>, DomainError> {
        sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to look up user email: {}", e),
                )
            })
    }
}
