//! Version-control error types.

use thiserror::Error;

/// Errors that can occur while talking to a remote repository.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The remote could not be reached or has no HEAD.
    #[error("Remote '{url}' is unreachable: {message}")]
    RemoteUnreachable { url: String, message: String },

    /// Cloning the remote failed.
    #[error("Failed to clone '{url}': {message}")]
    CloneFailed { url: String, message: String },

    /// Creating the bundle from the clone failed.
    #[error("Failed to create bundle for '{url}': {message}")]
    BundleFailed { url: String, message: String },

    /// The version-control tool could not be started.
    #[error("Failed to execute git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The operation did not finish in time.
    #[error("git {command} timed out after {timeout_secs} seconds")]
    Timeout { command: String, timeout_secs: u64 },
}

impl VcsError {
    /// Returns true if the remote should be treated as gone.
    #[must_use]
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::RemoteUnreachable { .. })
    }
}
