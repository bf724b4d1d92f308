//! Archive error types.

use crate::storage::StorageError;
use crate::vcs::VcsError;
use thiserror::Error;

/// Errors that abort archiving a single repository.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Failed to prepare the local workspace.
    #[error("Failed to prepare workspace '{path}': {source}")]
    Workspace {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Cloning or bundling failed.
    #[error(transparent)]
    Vcs(#[from] VcsError),

    /// Failed to move the bundle to its sharded path.
    #[error("Failed to stage bundle at '{path}': {source}")]
    Stage {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The storage write failed.
    #[error(transparent)]
    Upload(#[from] StorageError),

    /// The storage write did not finish in time.
    #[error("Upload of '{key}' timed out after {timeout_secs} seconds")]
    UploadTimeout { key: String, timeout_secs: u64 },

    /// Failed to remove the workspace after an otherwise successful archive.
    #[error("Failed to remove workspace '{path}': {source}")]
    Cleanup {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
