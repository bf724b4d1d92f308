//! Notification error types.

use thiserror::Error;

/// Errors that can occur while sending the end-of-run notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Failed to encode the payload.
    #[error("Failed to encode notification: {0}")]
    Encode(#[from] serde_json::Error),

    /// The request could not be sent.
    #[error("Notification request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Notification endpoint returned {status}")]
    Status { status: u16 },
}
