//! Processing result types.

use serde::Serialize;

/// Step of the per-repository sequence that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Soft-deleting an unreachable repository.
    Delete,
    /// Cloning, bundling, staging or uploading.
    Archive,
    /// Recording the new commit after a successful upload.
    Commit,
}

impl FailureStage {
    /// Returns the stage as a string for logging.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Archive => "archive",
            Self::Commit => "commit",
        }
    }
}

/// Result of processing a single repository.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessingResult {
    /// Bundle uploaded and commit recorded.
    Archived {
        /// Repository full name.
        repository: String,
        /// Storage key of the uploaded bundle.
        key: String,
        /// Commit now recorded in the registry.
        commit: String,
    },

    /// Repository soft-deleted because its remote is unreachable.
    Deleted {
        /// Repository full name.
        repository: String,
    },

    /// Processing failed; the registry row is unchanged.
    Failed {
        /// Repository full name.
        repository: String,
        /// Step that failed.
        stage: FailureStage,
        /// Error message.
        error: String,
    },
}
