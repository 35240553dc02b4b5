//! Resend email sender adapter.
//!
//! Implements the `EmailSender` trait against the Resend HTTP API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::EmailConfig;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{EmailMessage, EmailSender};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Resend implementation of the EmailSender port.
pub struct ResendEmailSender {
    api_key: SecretString,
    from_header: String,
    api_url: String,
    http_client: reqwest::Client,
}

impl ResendEmailSender {
    /// Creates a sender from the email configuration.
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            api_key: SecretString::new(config.resend_api_key.clone()),
            from_header: config.from_header(),
            api_url: RESEND_API_URL.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Set a custom API URL (for testing).
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), DomainError> {
        let body = SendRequest {
            from: &self.from_header,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html_body,
        };

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::EmailError, format!("Email request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DomainError::new(
                ErrorCode::EmailError,
                format!("Email provider returned {}: {}", status, detail),
            ));
        }

        Ok(())
    }
}
