//! PostgreSQL implementation of the payment ledger read port.
//!
//! Filters are expressed as null-tolerant predicates so every listing uses
//! one static statement regardless of which filters are set.

use crate::domain::foundation::{BusinessId, DomainError, ErrorCode, UserId};
use crate::domain::payment::Payment;
use crate::ports::{PageRequest, PaymentFilter, PaymentPage, PaymentReader};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::payment_repository::{status_to_string, PaymentRow};

/// PostgreSQL implementation of the PaymentReader port.
pub struct PostgresPaymentReader {
    pool: PgPool,
}

impl PostgresPaymentReader {
    /// Creates a new reader with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

struct FilterBinds {
    status: Option<&'static str>,
    created_after: Option<DateTime<Utc>>,
    created_before: Option<DateTime<Utc>>,
}

fn filter_binds(filter: &PaymentFilter) -> FilterBinds {
    FilterBinds {
        status: filter.status.as_ref().map(status_to_string),
        created_after: filter.created_after.map(|t| *t.as_datetime()),
        created_before: filter.created_before.map(|t| *t.as_datetime()),
    }
}

const LIST_COLUMNS: &str = "id, user_id, business_id, amount_minor, currency, status, \
     payment_method, transaction_ref, description, created_at, updated_at";

const FILTER_PREDICATE: &str = "($2::text IS NULL OR status = $2) \
     AND ($3::timestamptz IS NULL OR created_at >= $3) \
     AND ($4::timestamptz IS NULL OR created_at <= $4)";

// Same predicate for unscoped listings, where filters start at $1.
const FILTER_PREDICATE_UNSCOPED: &str = "($1::text IS NULL OR status = $1) \
     AND ($2::timestamptz IS NULL OR created_at >= $2) \
     AND ($3::timestamptz IS NULL OR created_at <= $3)";

#[async_trait]
impl PaymentReader for PostgresPaymentReader {
    async fn list_by_user(
        &self,
        user_id: &UserId,
        filter: &PaymentFilter,
        page: PageRequest,
    ) -> Result<PaymentPage, DomainError> {
        let binds = filter_binds(filter);

        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {LIST_COLUMNS} FROM payments \
             WHERE user_id = $1 AND {FILTER_PREDICATE} \
             ORDER BY created_at DESC LIMIT $5 OFFSET $6",
        ))
        .bind(user_id.as_str())
        .bind(binds.status)
        .bind(binds.created_after)
        .bind(binds.created_before)
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(list_error)?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM payments WHERE user_id = $1 AND {FILTER_PREDICATE}",
        ))
        .bind(user_id.as_str())
        .bind(binds.status)
        .bind(binds.created_after)
        .bind(binds.created_before)
        .fetch_one(&self.pool)
        .await
        .map_err(list_error)?;

        Ok(PaymentPage {
            items: rows
                .into_iter()
                .map(Payment::try_from)
                .collect::<Result<_, _>>()?,
            total: total as u64,
        })
    }

    async fn list_by_business(
        &self,
        business_id: &BusinessId,
        filter: &PaymentFilter,
        page: PageRequest,
    ) -> Result<PaymentPage, DomainError> {
        let binds = filter_binds(filter);

        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {LIST_COLUMNS} FROM payments \
             WHERE business_id = $1 AND {FILTER_PREDICATE} \
             ORDER BY created_at DESC LIMIT $5 OFFSET $6",
        ))
        .bind(business_id.as_uuid())
        .bind(binds.status)
        .bind(binds.created_after)
        .bind(binds.created_before)
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(list_error)?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM payments WHERE business_id = $1 AND {FILTER_PREDICATE}",
        ))
        .bind(business_id.as_uuid())
        .bind(binds.status)
        .bind(binds.created_after)
        .bind(binds.created_before)
        .fetch_one(&self.pool)
        .await
        .map_err(list_error)?;

        Ok(PaymentPage {
            items: rows
                .into_iter()
                .map(Payment::try_from)
                .collect::<Result<_, _>>()?,
            total: total as u64,
        })
    }

    async fn list_all(
        &self,
        filter: &PaymentFilter,
        page: PageRequest,
    ) -> Result<PaymentPage, DomainError> {
        let binds = filter_binds(filter);

        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {LIST_COLUMNS} FROM payments \
             WHERE {FILTER_PREDICATE_UNSCOPED} \
             ORDER BY created_at DESC LIMIT $4 OFFSET $5",
        ))
        .bind(binds.status)
        .bind(binds.created_after)
        .bind(binds.created_before)
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(list_error)?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM payments WHERE {FILTER_PREDICATE_UNSCOPED}",
        ))
        .bind(binds.status)
        .bind(binds.created_after)
        .bind(binds.created_before)
        .fetch_one(&self.pool)
        .await
        .map_err(list_error)?;

        Ok(PaymentPage {
            items: rows
                .into_iter()
                .map(Payment::try_from)
                .collect::<Result<_, _>>()?,
            total: total as u64,
        })
    }
}

fn list_error(e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to list payments: {}", e))
}
