//! Payment gateway configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Payment gateway configuration (PayTabs hosted payment pages)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Gateway merchant profile id
    pub paytabs_profile_id: String,

    /// Gateway server key (Authorization header credential)
    pub paytabs_server_key: String,

    /// Gateway API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Absolute URL the gateway calls server-to-server after payment
    pub callback_url: String,

    /// Absolute URL the gateway redirects the browser to after payment
    pub return_url: String,

    /// Frontend base URL for the success/failed/pending result pages
    pub result_base_url: String,

    /// Redirect bridge: maximum ledger poll attempts before re-verification
    #[serde(default = "default_poll_attempts")]
    pub redirect_poll_attempts: u32,

    /// Redirect bridge: interval between ledger polls in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub redirect_poll_interval_ms: u64,
}

impl PaymentConfig {
    /// Get the poll interval as a Duration
    pub fn redirect_poll_interval(&self) -> Duration {
        Duration::from_millis(self.redirect_poll_interval_ms)
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.paytabs_profile_id.is_empty() {
            return Err(ValidationError::MissingRequired("PAYTABS_PROFILE_ID"));
        }
        if self.paytabs_server_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYTABS_SERVER_KEY"));
        }
        for url in [
            &self.api_base_url,
            &self.callback_url,
            &self.return_url,
            &self.result_base_url,
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidGatewayUrl);
            }
        }
        if self.redirect_poll_attempts == 0 || self.redirect_poll_attempts > 60 {
            return Err(ValidationError::InvalidPollAttempts);
        }
        if self.redirect_poll_interval_ms < 50 || self.redirect_poll_interval_ms > 5000 {
            return Err(ValidationError::InvalidPollInterval);
        }
        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://secure.paytabs.sa".to_string()
}

// Defaults bound the hop-2 wait to ~3 seconds total.
fn default_poll_attempts() -> u32 {
    6
}

fn default_poll_interval_ms() -> u64 {
    500
}
