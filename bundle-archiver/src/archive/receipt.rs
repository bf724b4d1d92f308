//! Proof of a completed upload.

use crate::shard::ShardedKey;

/// Issued by the [`Archiver`](super::Archiver) once a bundle is durably stored.
///
/// It cannot be built outside this crate, so holding one means the upload
/// for `repository_id` succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    repository_id: i64,
    key: ShardedKey,
}

impl UploadReceipt {
    pub(crate) fn new(repository_id: i64, key: ShardedKey) -> Self {
        Self { repository_id, key }
    }

    /// Id of the repository whose bundle was uploaded.
    pub fn repository_id(&self) -> i64 {
        self.repository_id
    }

    /// Key the bundle was stored under.
    pub fn key(&self) -> &ShardedKey {
        &self.key
    }
}
