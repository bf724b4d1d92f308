//! Registry state transitions after detection and archival.

mod error;

pub use error::CommitError;

use crate::archive::UploadReceipt;
use crate::detect::ChangeCandidate;
use crate::registry::{Registry, Repository};
use std::sync::Arc;
use tracing::{debug, info};

/// Applies soft-deletes and commit advances to the registry.
#[derive(Clone)]
pub struct StateCommitter {
    registry: Arc<dyn Registry>,
}

impl StateCommitter {
    /// Creates a committer writing to `registry`.
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self { registry }
    }

    /// Marks a repository as no longer tracked. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`CommitError::Registry`] if the update fails.
    pub async fn mark_deleted(&self, repository: &Repository) -> Result<(), CommitError> {
        self.registry.mark_deleted(repository.id).await?;
        info!(repository = %repository.full_name(), "Repository marked as deleted");
        Ok(())
    }

    /// Records the candidate's new commit as the archived baseline.
    ///
    /// Requires the receipt of the upload that archived this commit, so the
    /// recorded commit never moves past what is actually stored.
    ///
    /// # Errors
    ///
    /// Returns [`CommitError::ReceiptMismatch`] if the receipt is for another
    /// repository, or [`CommitError::Registry`] if the update fails.
    pub async fn advance_commit(
        &self,
        candidate: &ChangeCandidate,
        receipt: &UploadReceipt,
    ) -> Result<(), CommitError> {
        let repository = &candidate.repository;
        if receipt.repository_id() != repository.id {
            return Err(CommitError::ReceiptMismatch {
                repository_id: repository.id,
                receipt_id: receipt.repository_id(),
            });
        }

        self.registry
            .set_last_commit(repository.id, &candidate.new_commit_hash)
            .await?;

        debug!(
            repository = %repository.full_name(),
            from = %repository.last_commit_hash,
            to = %candidate.new_commit_hash,
            key = %receipt.key(),
            "Advanced recorded commit"
        );
        Ok(())
    }
}
