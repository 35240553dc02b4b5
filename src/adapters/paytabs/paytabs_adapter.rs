//! PayTabs payment gateway adapter.
//!
//! Implements the `PaymentGateway` trait against the PayTabs hosted-payment
//! API: page creation (`/payment/request`) and transaction queries
//! (`/payment/query`). The server key authenticates every call; callbacks
//! themselves carry no trusted state and are always re-verified through the
//! query endpoint.
//!
//! # Configuration
//!
//! ```ignore
//! let config = PayTabsConfig::new(profile_id, server_key);
//! let adapter = PayTabsGatewayAdapter::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::payment::PaymentStatus;
use crate::ports::{
    GatewayError, GatewayPaymentResult, HostedPayment, HostedPaymentRequest, PaymentGateway,
};

use super::api_types::{self, PageResponse, QueryResponse};

/// PayTabs API configuration.
#[derive(Clone)]
pub struct PayTabsConfig {
    /// Merchant profile id.
    profile_id: String,

    /// Server key sent as the Authorization header.
    server_key: SecretString,

    /// Base URL for the PayTabs API (region-specific).
    api_base_url: String,
}

impl PayTabsConfig {
    /// Create a new PayTabs configuration.
    pub fn new(profile_id: impl Into<String>, server_key: impl Into<String>) -> Self {
        Self {
            profile_id: profile_id.into(),
            server_key: SecretString::new(server_key.into()),
            api_base_url: "https://secure.paytabs.sa".to_string(),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `PAYTABS_PROFILE_ID` and `PAYTABS_SERVER_KEY`.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        let profile_id = std::env::var("PAYTABS_PROFILE_ID")?;
        let server_key = std::env::var("PAYTABS_SERVER_KEY")?;
        Ok(Self::new(profile_id, server_key))
    }

    /// Set a custom API base URL (regional endpoints, testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Maps a gateway response status code to the local status vocabulary.
///
/// Only the explicit authorized code maps to Completed. Declines, errors,
/// voids, and cancellations map to Failed. Everything else, including codes
/// this adapter has never seen, maps to Pending: erring toward "not yet
/// decided" is required, falsely confirming payment is not an option.
pub fn parse_response_status(code: &str) -> PaymentStatus {
    match code.trim().to_uppercase().as_str() {
        "A" => PaymentStatus::Completed,
        "D" | "E" | "V" | "C" | "X" => PaymentStatus::Failed,
        _ => PaymentStatus::Pending,
    }
}

/// PayTabs gateway adapter.
pub struct PayTabsGatewayAdapter {
    config: PayTabsConfig,
    http_client: reqwest::Client,
}

impl PayTabsGatewayAdapter {
    /// Create a new adapter with the given configuration.
    pub fn new(config: PayTabsConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    async fn post_json<Req: serde::Serialize, Resp: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp, GatewayError> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .http_client
            .post(&url)
            .header(
                reqwest::header::AUTHORIZATION,
                self.config.server_key.expose_secret().as_str(),
            )
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, "Gateway request failed");
                GatewayError::network(e.to_string())
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(GatewayError::authentication(format!(
                "Gateway rejected credentials ({})",
                status
            )));
        }

        response.json::<Resp>().await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Unparseable gateway response");
            GatewayError::invalid_response(e.to_string())
        })
    }
}

#[async_trait]
impl PaymentGateway for PayTabsGatewayAdapter {
    async fn create_hosted_payment(
        &self,
        request: HostedPaymentRequest,
    ) -> Result<HostedPayment, GatewayError> {
        let body = api_types::PageRequest {
            profile_id: self.config.profile_id.clone(),
            tran_type: "sale".to_string(),
            tran_class: "ecom".to_string(),
            cart_id: request.correlation_id,
            cart_description: request.description,
            cart_currency: request.amount.currency().to_string(),
            cart_amount: request.amount.display_amount(),
            customer_details: api_types::CustomerDetails {
                name: request.customer.name,
                email: request.customer.email,
            },
            callback: request.callback_url,
            return_url: request.return_url,
        };

        let response: PageResponse = self.post_json("/payment/request", &body).await?;

        match (response.tran_ref, response.redirect_url) {
            (Some(tran_ref), Some(redirect_url)) => Ok(HostedPayment {
                redirect_url,
                transaction_ref: tran_ref,
            }),
            _ => {
                let message = response
                    .message
                    .unwrap_or_else(|| "Gateway returned no payment page".to_string());
                tracing::warn!(
                    code = ?response.code,
                    message = %message,
                    "Hosted page creation rejected"
                );
                Err(GatewayError::rejected(message))
            }
        }
    }

    async fn verify_payment(
        &self,
        transaction_ref: &str,
    ) -> Result<GatewayPaymentResult, GatewayError> {
        let body = api_types::QueryRequest {
            profile_id: self.config.profile_id.clone(),
            tran_ref: transaction_ref.to_string(),
        };

        let response: QueryResponse = self.post_json("/payment/query", &body).await?;

        // A missing result block means the gateway has nothing decided for
        // this reference yet; report Pending rather than failing the caller.
        let (status, response_code, message) = match response.payment_result {
            Some(result) => {
                let status = parse_response_status(&result.response_status);
                (
                    status,
                    result.response_status,
                    result.response_message.unwrap_or_default(),
                )
            }
            None => (
                PaymentStatus::Pending,
                String::new(),
                response.message.unwrap_or_default(),
            ),
        };

        Ok(GatewayPaymentResult {
            transaction_ref: response
                .tran_ref
                .unwrap_or_else(|| transaction_ref.to_string()),
            correlation_id: response.cart_id,
            status,
            response_code,
            message,
        })
    }
}
