//! Payment ledger read port.
//!
//! Paginated, filterable listings for the plain CRUD endpoints. Reads never
//! mutate state.

use crate::domain::foundation::{BusinessId, DomainError, Timestamp, UserId};
use crate::domain::payment::{Payment, PaymentStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Maximum page size a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Pagination window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum rows to return (clamped to [`MAX_PAGE_LIMIT`]).
    pub limit: u32,

    /// Rows to skip.
    pub offset: u32,
}

impl PageRequest {
    /// Creates a page request with the limit clamped to the allowed range.
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
            offset,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

/// Optional listing filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentFilter {
    /// Keep only payments with this status.
    pub status: Option<PaymentStatus>,

    /// Keep only payments created at or after this time.
    pub created_after: Option<Timestamp>,

    /// Keep only payments created at or before this time.
    pub created_before: Option<Timestamp>,
}

impl PaymentFilter {
    /// True when the payment passes every set filter.
    pub fn matches(&self, payment: &Payment) -> bool {
        if let Some(status) = self.status {
            if payment.status != status {
                return false;
            }
        }
        if let Some(after) = self.created_after {
            if payment.created_at.is_before(&after) {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if payment.created_at.is_after(&before) {
                return false;
            }
        }
        true
    }
}

/// One page of payments plus the unpaged total.
#[derive(Debug, Clone)]
pub struct PaymentPage {
    pub items: Vec<Payment>,
    pub total: u64,
}

/// Port for payment ledger reads.
#[async_trait]
pub trait PaymentReader: Send + Sync {
    /// List a user's own payments, newest first.
    async fn list_by_user(
        &self,
        user_id: &UserId,
        filter: &PaymentFilter,
        page: PageRequest,
    ) -> Result<PaymentPage, DomainError>;

    /// List payments for a business, newest first.
    async fn list_by_business(
        &self,
        business_id: &BusinessId,
        filter: &PaymentFilter,
        page: PageRequest,
    ) -> Result<PaymentPage, DomainError>;

    /// List all payments (admin), newest first.
    async fn list_all(
        &self,
        filter: &PaymentFilter,
        page: PageRequest,
    ) -> Result<PaymentPage, DomainError>;
}
