//! HTTP webhook notifier.

use super::{Notifier, NotifyError};
use crate::summary::RunSummary;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default time allowed for the notification request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Body posted to the webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationPayload {
    /// Number of repositories scanned.
    pub total: usize,
    /// Number of repositories archived.
    pub updated: usize,
}

impl From<&RunSummary> for NotificationPayload {
    fn from(summary: &RunSummary) -> Self {
        Self {
            total: summary.total_scanned,
            updated: summary.total_updated,
        }
    }
}

/// Webhook endpoint settings.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// URL the summary is posted to.
    pub endpoint: Url,
    /// Value of the `Authorization` header.
    pub key: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl NotifierConfig {
    /// Creates a configuration with the default timeout.
    pub fn new(endpoint: Url, key: String) -> Self {
        Self {
            endpoint,
            key,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Posts `{ "total": .., "updated": .. }` to a configured endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    config: NotifierConfig,
}

impl WebhookNotifier {
    /// Builds a notifier.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: NotifierConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, summary: &RunSummary) -> Result<(), NotifyError> {
        let payload = NotificationPayload::from(summary);
        let body = serde_json::to_vec(&payload)?;
        debug!(endpoint = %self.config.endpoint, ?payload, "Sending notification");

        let response = self
            .client
            .post(self.config.endpoint.clone())
            .header(AUTHORIZATION, &self.config.key)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                status: status.as_u16(),
            });
        }

        info!(total = payload.total, updated = payload.updated, "Notification sent");
        Ok(())
    }
}
