//! PostgreSQL implementation of the business directory entitlement port.

use crate::domain::foundation::{BusinessId, DomainError, ErrorCode};
use crate::domain::subscription::EntitlementGrant;
use crate::ports::BusinessDirectory;
use async_trait::async_trait;
use sqlx::PgPool;

/// PostgreSQL implementation of the BusinessDirectory port.
pub struct PostgresBusinessDirectory {
    pool: PgPool,
}

impl PostgresBusinessDirectory {
    /// Creates a new directory adapter with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BusinessDirectory for PostgresBusinessDirectory {
    async fn apply_entitlements(
        &self,
        business_id: &BusinessId,
        grant: &EntitlementGrant,
    ) -> Result<(), DomainError> {
        // `is_verified OR $4` keeps the verified flag monotone, and the
        // COALESCE leaves an existing promotion window alone when the plan
        // grants no top placement.
        let result = sqlx::query(
            r#"
            UPDATE businesses SET
                allow_advertisements = $2,
                promoted_until = COALESCE($3, promoted_until),
                is_verified = is_verified OR $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(business_id.as_uuid())
        .bind(grant.allow_advertisements)
        .bind(grant.promoted_until.map(|t| *t.as_datetime()))
        .bind(grant.grant_verified_badge)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to apply entitlements: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::BusinessNotFound,
                format!("Business not found: {}", business_id),
            ));
        }

        Ok(())
    }
}
