//! Remote version-control operations.
//!
//! The pipeline only needs two things from a remote: its current HEAD commit,
//! and a bundle of recent history. Both sit behind [`VcsClient`] so the
//! archival phase can run against a fake without invoking real clones.

mod error;
mod git;

pub use error::VcsError;
pub use git::{GitCli, DEFAULT_CLONE_DEPTH};

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Client for remote repository operations.
#[async_trait]
pub trait VcsClient: Send + Sync {
    /// Resolves the commit the remote's HEAD points to, without cloning.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::RemoteUnreachable`] if the remote cannot be reached
    /// or has no HEAD.
    async fn head_hash(&self, remote_url: &str) -> Result<String, VcsError>;

    /// Clones `remote_url` into `workspace` and bundles the history reachable from HEAD.
    ///
    /// Returns the path of the bundle file, which lies inside `workspace`.
    /// On failure the workspace is left in an indeterminate state; the caller
    /// must still remove it.
    ///
    /// # Errors
    ///
    /// Returns [`VcsError::CloneFailed`] or [`VcsError::BundleFailed`].
    async fn create_bundle(&self, remote_url: &str, workspace: &Path)
        -> Result<PathBuf, VcsError>;
}
