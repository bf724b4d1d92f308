//! Host check error types.

use thiserror::Error;

/// Errors that can occur while checking a host.
#[derive(Debug, Error)]
pub enum HealthError {
    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The host did not answer.
    #[error("Request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The host answered with a non-success status.
    #[error("'{url}' returned {status}")]
    Status { url: String, status: u16 },
}
