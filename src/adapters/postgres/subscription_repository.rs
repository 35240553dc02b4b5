//! PostgreSQL implementation of the subscription repository port.

use crate::domain::foundation::{
    BusinessId, DomainError, ErrorCode, PlanId, SubscriptionId, Timestamp,
};
use crate::domain::subscription::{BusinessSubscription, SubscriptionStatus};
use crate::ports::SubscriptionRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the SubscriptionRepository port.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    business_id: Uuid,
    plan_id: Uuid,
    status: String,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    payment_ref: Option<String>,
    payment_provider: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for BusinessSubscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(BusinessSubscription {
            id: SubscriptionId::from_uuid(row.id),
            business_id: BusinessId::from_uuid(row.business_id),
            plan_id: PlanId::from_uuid(row.plan_id),
            status: parse_status(&row.status)?,
            starts_at: row.starts_at.map(Timestamp::from_datetime),
            ends_at: row.ends_at.map(Timestamp::from_datetime),
            payment_ref: row.payment_ref,
            payment_provider: row.payment_provider,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse_status(s: &str) -> Result<SubscriptionStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(SubscriptionStatus::Pending),
        "active" => Ok(SubscriptionStatus::Active),
        "failed" => Ok(SubscriptionStatus::Failed),
        "cancelled" => Ok(SubscriptionStatus::Cancelled),
        "expired" => Ok(SubscriptionStatus::Expired),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid subscription status value: {}", s),
        )),
    }
}

fn status_to_string(status: &SubscriptionStatus) -> &'static str {
    match status {
        SubscriptionStatus::Pending => "pending",
        SubscriptionStatus::Active => "active",
        SubscriptionStatus::Failed => "failed",
        SubscriptionStatus::Cancelled => "cancelled",
        SubscriptionStatus::Expired => "expired",
    }
}

const SELECT_COLUMNS: &str = "id, business_id, plan_id, status, starts_at, ends_at, \
     payment_ref, payment_provider, created_at, updated_at";

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn save(&self, subscription: &BusinessSubscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO business_subscriptions (
                id, business_id, plan_id, status, starts_at, ends_at,
                payment_ref, payment_provider, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.business_id.as_uuid())
        .bind(subscription.plan_id.as_uuid())
        .bind(status_to_string(&subscription.status))
        .bind(subscription.starts_at.map(|t| *t.as_datetime()))
        .bind(subscription.ends_at.map(|t| *t.as_datetime()))
        .bind(&subscription.payment_ref)
        .bind(&subscription.payment_provider)
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to save subscription: {}", e),
            )
        })?;

        Ok(())
    }

    async fn update(&self, subscription: &BusinessSubscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE business_subscriptions SET
                status = $2,
                starts_at = $3,
                ends_at = $4,
                payment_ref = $5,
                payment_provider = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(status_to_string(&subscription.status))
        .bind(subscription.starts_at.map(|t| *t.as_datetime()))
        .bind(subscription.ends_at.map(|t| *t.as_datetime()))
        .bind(&subscription.payment_ref)
        .bind(&subscription.payment_provider)
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update subscription: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                "Subscription not found",
            ));
        }

        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<BusinessSubscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM business_subscriptions WHERE id = $1",
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find subscription: {}", e),
            )
        })?;

        row.map(BusinessSubscription::try_from).transpose()
    }

    async fn find_latest_pending_by_business(
        &self,
        business_id: &BusinessId,
    ) -> Result<Option<BusinessSubscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM business_subscriptions \
             WHERE business_id = $1 AND status = 'pending' \
             ORDER BY created_at DESC LIMIT 1",
        ))
        .bind(business_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to find pending subscription: {}", e),
            )
        })?;

        row.map(BusinessSubscription::try_from).transpose()
    }
}
