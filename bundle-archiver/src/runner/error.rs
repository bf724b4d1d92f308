//! Runner error types.

use crate::health::HealthError;
use crate::registry::RegistryError;

/// Errors that abort a run before any repository is touched.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Registry unreachable, or the configured host is missing.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The host did not answer, so its repositories cannot be told apart
    /// from deleted ones.
    #[error("Host '{host}' is unreachable: {source}")]
    HostUnreachable {
        host: String,
        #[source]
        source: HealthError,
    },

    /// The workspace directory could not be created.
    #[error("Failed to create workspace '{path}': {source}")]
    Workspace {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
