//! Clone, bundle, stage and upload a single repository.
//!
//! Every repository gets its own workspace root named after its id, so no
//! two repositories share a directory within a run. The local layout below
//! the workspace base for repository `foo` (id 7) is:
//!
//! ```text
//! <base>/
//! └── 7/                      workspace root, removed after every archive
//!     ├── .work/              clone and raw bundle
//!     └── f/o/o/7.bundle      staged bundle, uploaded as "f/o/o/7.bundle"
//! ```
//!
//! Shard segments never start with `.`, so `.work` cannot clash with the
//! staged tree.

mod error;
mod receipt;

pub use error::ArchiveError;
pub use receipt::UploadReceipt;

use crate::registry::{Host, Repository};
use crate::shard::{shard, ShardedKey};
use crate::storage::ObjectStore;
use crate::vcs::VcsClient;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, Instrument};

/// Directory inside the workspace root handed to the VCS client.
const WORK_DIR: &str = ".work";

/// Default time allowed for a single upload.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Produces and uploads the bundle for one repository at a time.
pub struct Archiver {
    vcs: Arc<dyn VcsClient>,
    store: Arc<dyn ObjectStore>,
    workspace_base: PathBuf,
    upload_timeout: Duration,
}

impl Archiver {
    /// Creates an archiver staging bundles below `workspace_base`.
    pub fn new(
        vcs: Arc<dyn VcsClient>,
        store: Arc<dyn ObjectStore>,
        workspace_base: impl Into<PathBuf>,
    ) -> Self {
        Self {
            vcs,
            store,
            workspace_base: workspace_base.into(),
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }

    /// Sets the upload timeout.
    pub fn with_upload_timeout(mut self, upload_timeout: Duration) -> Self {
        self.upload_timeout = upload_timeout;
        self
    }

    /// Returns the directory workspaces are created in.
    pub fn workspace_base(&self) -> &Path {
        &self.workspace_base
    }

    /// Returns the workspace root used for `repository`.
    pub fn workspace_root(&self, repository: &Repository) -> PathBuf {
        self.workspace_base.join(repository.id.to_string())
    }

    /// Archives `repository` and returns a receipt for the uploaded bundle.
    ///
    /// The workspace root is removed before returning, whether or not the
    /// archive succeeded. No registry state is touched.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError`] if cloning, bundling, staging or uploading
    /// fails, or if the workspace cannot be removed after a successful upload.
    pub async fn archive(
        &self,
        repository: &Repository,
        host: &Host,
    ) -> Result<UploadReceipt, ArchiveError> {
        let span = info_span!(
            "archive",
            repository = %repository.full_name(),
            id = repository.id
        );

        async {
            let key = shard(&repository.name, repository.id);
            let root = self.workspace_root(repository);

            let result = self.bundle_and_upload(repository, host, &key, &root).await;
            let cleanup = remove_dir_if_exists(&root).await;

            match (result, cleanup) {
                (Ok(()), Ok(())) => {
                    info!(key = %key, "Bundle archived");
                    Ok(UploadReceipt::new(repository.id, key))
                }
                (Ok(()), Err(source)) => Err(ArchiveError::Cleanup {
                    path: root.display().to_string(),
                    source,
                }),
                (Err(e), Ok(())) => Err(e),
                (Err(e), Err(cleanup_error)) => {
                    error!(
                        path = %root.display(),
                        error = %cleanup_error,
                        "Failed to remove workspace"
                    );
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn bundle_and_upload(
        &self,
        repository: &Repository,
        host: &Host,
        key: &ShardedKey,
        root: &Path,
    ) -> Result<(), ArchiveError> {
        // A previous run may have been killed before cleaning up.
        remove_dir_if_exists(root)
            .await
            .map_err(|source| ArchiveError::Workspace {
                path: root.display().to_string(),
                source,
            })?;

        let work = root.join(WORK_DIR);
        tokio::fs::create_dir_all(&work)
            .await
            .map_err(|source| ArchiveError::Workspace {
                path: work.display().to_string(),
                source,
            })?;

        let url = host.remote_url(repository);
        let bundle = self.vcs.create_bundle(&url, &work).await?;

        let staged = key.local_path(root);
        stage(&bundle, &staged).await?;
        debug!(path = %staged.display(), "Bundle staged");

        let object_key = key.key();
        tokio::time::timeout(self.upload_timeout, self.store.put(&object_key, &staged))
            .await
            .map_err(|_| ArchiveError::UploadTimeout {
                key: object_key.clone(),
                timeout_secs: self.upload_timeout.as_secs(),
            })??;

        Ok(())
    }
}

/// Moves the bundle to its sharded path, creating intermediate directories.
async fn stage(bundle: &Path, staged: &Path) -> Result<(), ArchiveError> {
    let stage_error = |source| ArchiveError::Stage {
        path: staged.display().to_string(),
        source,
    };

    if let Some(parent) = staged.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(stage_error)?;
    }
    tokio::fs::rename(bundle, staged).await.map_err(stage_error)
}

async fn remove_dir_if_exists(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
