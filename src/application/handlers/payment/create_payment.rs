//! CreatePaymentHandler - checkout initiation.
//!
//! Writes the Pending ledger row, asks the gateway for a hosted payment
//! page, and hands the redirect URL back. A hosted-page failure marks the
//! payment Failed immediately; the user restarts checkout, nothing retries.

use std::sync::Arc;

use crate::domain::foundation::{BusinessId, Money, UserId};
use crate::domain::payment::{Payment, PaymentError, PaymentStatus};
use crate::ports::{
    CustomerDetails, HostedPaymentRequest, PaymentGateway, PaymentRepository,
};

/// Absolute URLs the gateway needs at page-creation time.
#[derive(Debug, Clone)]
pub struct GatewayUrls {
    /// Server-to-server callback endpoint.
    pub callback_url: String,

    /// Browser return endpoint (bridge hop 1).
    pub return_url: String,
}

/// Command to create a payment and hosted payment page.
#[derive(Debug, Clone)]
pub struct CreatePaymentCommand {
    pub user_id: UserId,
    pub business_id: BusinessId,
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub customer_name: String,
    pub customer_email: String,
}

/// Result of payment creation.
#[derive(Debug, Clone)]
pub struct CreatePaymentResult {
    /// The persisted payment (Pending, transaction ref recorded).
    pub payment: Payment,

    /// Hosted payment page the browser should be sent to.
    pub redirect_url: String,
}

/// Handler for checkout initiation.
pub struct CreatePaymentHandler {
    payments: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    urls: GatewayUrls,
}

impl CreatePaymentHandler {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        urls: GatewayUrls,
    ) -> Self {
        Self {
            payments,
            gateway,
            urls,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreatePaymentCommand,
    ) -> Result<CreatePaymentResult, PaymentError> {
        let amount = Money::new(cmd.amount_minor, cmd.currency)
            .map_err(|e| PaymentError::validation("amount", e.to_string()))?;

        let mut payment = Payment::create(
            cmd.user_id,
            cmd.business_id,
            amount.clone(),
            cmd.description.clone(),
        );
        self.payments.save(&payment).await.map_err(PaymentError::from)?;

        let request = HostedPaymentRequest {
            correlation_id: payment.id.to_string(),
            amount,
            description: cmd.description,
            customer: CustomerDetails {
                name: cmd.customer_name,
                email: cmd.customer_email,
            },
            callback_url: self.urls.callback_url.clone(),
            return_url: self.urls.return_url.clone(),
        };

        let hosted = match self.gateway.create_hosted_payment(request).await {
            Ok(hosted) => hosted,
            Err(gateway_err) => {
                // No retry: the user must restart checkout. Mark the row
                // Failed so it cannot be settled by a stray callback later.
                if let Err(err) = self
                    .payments
                    .transition(&payment.id, PaymentStatus::Failed, None)
                    .await
                {
                    tracing::error!(
                        payment_id = %payment.id,
                        error = %err,
                        "Failed to mark payment failed after hosted-page error"
                    );
                }
                tracing::warn!(
                    payment_id = %payment.id,
                    error = %gateway_err,
                    "Hosted payment page creation failed"
                );
                return Err(PaymentError::gateway_terminal(gateway_err.message));
            }
        };

        self.payments
            .record_transaction_ref(&payment.id, &hosted.transaction_ref)
            .await
            .map_err(PaymentError::from)?;
        payment.record_transaction_ref(&hosted.transaction_ref).map_err(PaymentError::from)?;

        Ok(CreatePaymentResult {
            payment,
            redirect_url: hosted.redirect_url,
        })
    }
}
