//! PostgreSQL implementation of the payment ledger write port.
//!
//! The guarded transition is a single conditional UPDATE with RETURNING:
//! the terminal-state check and the write are one statement, so the guard
//! holds under true parallel execution across server instances, not just
//! interleaved tasks in one process.

use crate::domain::foundation::{
    BusinessId, DomainError, ErrorCode, Money, PaymentId, StateMachine, Timestamp, UserId,
};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::ports::{PaymentRepository, TransitionOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// PostgreSQL implementation of the PaymentRepository port.
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PaymentRow {
    pub id: Uuid,
    pub user_id: String,
    pub business_id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub payment_method: String,
    pub transaction_ref: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.status)?;
        let amount = Money::new(row.amount_minor, row.currency).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid amount: {}", e))
        })?;

        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            business_id: BusinessId::from_uuid(row.business_id),
            amount,
            status,
            payment_method: row.payment_method,
            transaction_ref: row.transaction_ref,
            description: row.description,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

pub(crate) fn parse_status(s: &str) -> Result<PaymentStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(PaymentStatus::Pending),
        "completed" => Ok(PaymentStatus::Completed),
        "failed" => Ok(PaymentStatus::Failed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid payment status value: {}", s),
        )),
    }
}

pub(crate) fn status_to_string(status: &PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "pending",
        PaymentStatus::Completed => "completed",
        PaymentStatus::Failed => "failed",
    }
}

const SELECT_COLUMNS: &str = "id, user_id, business_id, amount_minor, currency, status, \
     payment_method, transaction_ref, description, created_at, updated_at";

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn save(&self, payment: &Payment) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, user_id, business_id, amount_minor, currency, status,
                payment_method, transaction_ref, description, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.user_id.as_str())
        .bind(payment.business_id.as_uuid())
        .bind(payment.amount.amount_minor())
        .bind(payment.amount.currency())
        .bind(status_to_string(&payment.status))
        .bind(&payment.payment_method)
        .bind(&payment.transaction_ref)
        .bind(&payment.description)
        .bind(payment.created_at.as_datetime())
        .bind(payment.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to save payment: {}", e))
        })?;

        Ok(())
    }

    async fn record_transaction_ref(
        &self,
        id: &PaymentId,
        transaction_ref: &str,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET transaction_ref = $2, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id.as_uuid())
        .bind(transaction_ref)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to record transaction ref: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::PaymentNotFound,
                "No pending payment to assign transaction reference to",
            ));
        }

        Ok(())
    }

    async fn transition(
        &self,
        id: &PaymentId,
        new_status: PaymentStatus,
        transaction_ref: Option<&str>,
    ) -> Result<TransitionOutcome, DomainError> {
        if !new_status.is_terminal() {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                "Transition target must be a terminal status",
            ));
        }

        // Compare-and-set: only a pending row is written, and the write
        // returns the updated row. Concurrent settlers race on this one
        // statement; the loser falls through to the plain read below.
        let updated: Option<PaymentRow> = sqlx::query_as(&format!(
            r#"
            UPDATE payments
            SET status = $2,
                transaction_ref = COALESCE($3, transaction_ref),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {SELECT_COLUMNS}
            "#,
        ))
        .bind(id.as_uuid())
        .bind(status_to_string(&new_status))
        .bind(transaction_ref)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to transition payment: {}", e),
            )
        })?;

        if let Some(row) = updated {
            return Ok(TransitionOutcome {
                payment: Payment::try_from(row)?,
                changed: true,
            });
        }

        let existing = self.find_by_id(id).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::PaymentNotFound,
                format!("Payment not found: {}", id),
            )
        })?;

        Ok(TransitionOutcome {
            payment: existing,
            changed: false,
        })
    }

    async fn find_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM payments WHERE id = $1",
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find payment: {}", e))
        })?;

        row.map(Payment::try_from).transpose()
    }
}
