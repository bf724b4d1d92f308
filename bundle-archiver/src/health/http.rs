//! [`HostCheck`] issuing a GET to the host's remote prefix.

use super::{HealthError, HostCheck};
use crate::registry::Host;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};

/// Default time allowed for the host check.
pub const DEFAULT_HOST_CHECK_TIMEOUT: Duration = Duration::from_secs(30);

/// Requires a success status (after redirects) from `GET <remote_prefix>`.
#[derive(Debug, Clone)]
pub struct HttpHostCheck {
    client: reqwest::Client,
}

impl HttpHostCheck {
    /// Builds a checker whose request times out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`HealthError::Client`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, HealthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(HealthError::Client)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HostCheck for HttpHostCheck {
    async fn check(&self, host: &Host) -> Result<(), HealthError> {
        let url = host.remote_prefix.as_str();
        info!(host = %host.name, url, "Checking host connectivity");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| HealthError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(host = %host.name, %status, "Host check failed");
            return Err(HealthError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
