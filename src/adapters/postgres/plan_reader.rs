//! PostgreSQL implementation of the plan reader port.

use crate::domain::foundation::{DomainError, ErrorCode, PlanId};
use crate::domain::subscription::{PlanEntitlements, SubscriptionPlan};
use crate::ports::PlanReader;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the PlanReader port.
pub struct PostgresPlanReader {
    pool: PgPool,
}

impl PostgresPlanReader {
    /// Creates a new reader with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    name: String,
    duration_days: i32,
    allow_advertisements: bool,
    top_placement: bool,
    verified_badge: bool,
    priority_support: bool,
}

impl From<PlanRow> for SubscriptionPlan {
    fn from(row: PlanRow) -> Self {
        SubscriptionPlan {
            id: PlanId::from_uuid(row.id),
            name: row.name,
            duration_days: row.duration_days.max(0) as u32,
            entitlements: PlanEntitlements {
                allow_advertisements: row.allow_advertisements,
                top_placement: row.top_placement,
                verified_badge: row.verified_badge,
                priority_support: row.priority_support,
            },
        }
    }
}

#[async_trait]
impl PlanReader for PostgresPlanReader {
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<SubscriptionPlan>, DomainError> {
        let row: Option<PlanRow> = sqlx::query_as(
            r#"
            SELECT id, name, duration_days, allow_advertisements,
                   top_placement, verified_badge, priority_support
            FROM subscription_plans
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find plan: {}", e))
        })?;

        Ok(row.map(SubscriptionPlan::from))
    }
}
