//! GetPaymentHandler - single payment lookup.

use std::sync::Arc;

use crate::domain::foundation::PaymentId;
use crate::domain::payment::{Payment, PaymentError};
use crate::ports::PaymentRepository;

/// Query for one payment by id.
#[derive(Debug, Clone)]
pub struct GetPaymentQuery {
    pub payment_id: PaymentId,
}

/// Handler for single payment lookups.
pub struct GetPaymentHandler {
    payments: Arc<dyn PaymentRepository>,
}

impl GetPaymentHandler {
    pub fn new(payments: Arc<dyn PaymentRepository>) -> Self {
        Self { payments }
    }

    pub async fn handle(&self, query: GetPaymentQuery) -> Result<Payment, PaymentError> {
        self.payments
            .find_by_id(&query.payment_id)
            .await
            .map_err(PaymentError::from)?
            .ok_or_else(|| PaymentError::not_found(query.payment_id))
    }
}
