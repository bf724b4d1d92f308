//! Durable object storage for bundles.

mod error;
mod s3;

pub use error::StorageError;
pub use s3::{S3Store, StorageConfig, DEFAULT_REGION};

use async_trait::async_trait;
use std::path::Path;

/// Destination for staged bundles.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads the file at `local_path` under `key`, replacing any existing object.
    async fn put(&self, key: &str, local_path: &Path) -> Result<(), StorageError>;
}
