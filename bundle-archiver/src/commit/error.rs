//! State commit error types.

use crate::registry::RegistryError;
use thiserror::Error;

/// Errors that can occur while recording a state transition.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The registry write failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The receipt belongs to a different repository.
    #[error("Upload receipt for repository {receipt_id} cannot advance repository {repository_id}")]
    ReceiptMismatch { repository_id: i64, receipt_id: i64 },
}
