//! ListPaymentsHandler - paginated ledger listings.

use std::sync::Arc;

use crate::domain::foundation::{BusinessId, UserId};
use crate::domain::payment::PaymentError;
use crate::ports::{PageRequest, PaymentFilter, PaymentPage, PaymentReader};

/// Query for the authenticated user's own payments.
#[derive(Debug, Clone)]
pub struct ListMyPaymentsQuery {
    pub user_id: UserId,
    pub filter: PaymentFilter,
    pub page: PageRequest,
}

/// Query for a business's payments.
#[derive(Debug, Clone)]
pub struct ListBusinessPaymentsQuery {
    pub business_id: BusinessId,
    pub filter: PaymentFilter,
    pub page: PageRequest,
}

/// Query for all payments (admin).
#[derive(Debug, Clone)]
pub struct ListAllPaymentsQuery {
    pub filter: PaymentFilter,
    pub page: PageRequest,
}

/// Handler for ledger listing queries.
pub struct ListPaymentsHandler {
    reader: Arc<dyn PaymentReader>,
}

impl ListPaymentsHandler {
    pub fn new(reader: Arc<dyn PaymentReader>) -> Self {
        Self { reader }
    }

    pub async fn list_mine(
        &self,
        query: ListMyPaymentsQuery,
    ) -> Result<PaymentPage, PaymentError> {
        self.reader
            .list_by_user(&query.user_id, &query.filter, query.page)
            .await
            .map_err(PaymentError::from)
    }

    pub async fn list_for_business(
        &self,
        query: ListBusinessPaymentsQuery,
    ) -> Result<PaymentPage, PaymentError> {
        self.reader
            .list_by_business(&query.business_id, &query.filter, query.page)
            .await
            .map_err(PaymentError::from)
    }

    pub async fn list_all(&self, query: ListAllPaymentsQuery) -> Result<PaymentPage, PaymentError> {
        self.reader
            .list_all(&query.filter, query.page)
            .await
            .map_err(PaymentError::from)
    }
}
