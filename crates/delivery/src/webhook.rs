//! Webhook delivery of company pushes.
//!
//! [`WebhookNotifier`] POSTs a JSON-encoded [`CompanyPush`] to the configured
//! URL. Each push makes exactly one attempt; a failure is returned to the
//! caller, which leaves the pushed set untouched so the push can be issued
//! again.

use std::time::Duration;

use async_trait::async_trait;
use leadwatch_core::notify::{CompanyNotifier, CompanyPush, NotifyError};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl WebhookConfig {
    /// Load webhook config from environment.
    ///
    /// Returns `None` if `WEBHOOK_URL` is not set. `WEBHOOK_TIMEOUT_SECS`
    /// defaults to 30.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("WEBHOOK_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())?;
        let timeout_secs = std::env::var("WEBHOOK_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        Some(Self { url, timeout_secs })
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

impl From<WebhookError> for NotifyError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::Request(e) => NotifyError::Request(e.to_string()),
            WebhookError::HttpStatus(status) => NotifyError::HttpStatus(status),
        }
    }
}

// ---------------------------------------------------------------------------
// WebhookNotifier
// ---------------------------------------------------------------------------

/// Delivers company pushes to a single webhook endpoint.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(config: WebhookConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.url,
        })
    }

    /// Execute a single POST request and check the response status.
    pub async fn send(&self, push: &CompanyPush) -> Result<(), WebhookError> {
        let response = self.client.post(&self.url).json(push).send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl CompanyNotifier for WebhookNotifier {
    async fn notify(&self, push: &CompanyPush) -> Result<(), NotifyError> {
        match self.send(push).await {
            Ok(()) => {
                tracing::info!(
                    campaign_id = %push.campaign_id,
                    count = push.count,
                    "Pushed companies to webhook"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(campaign_id = %push.campaign_id, error = %e, "Webhook delivery failed");
                Err(e.into())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
