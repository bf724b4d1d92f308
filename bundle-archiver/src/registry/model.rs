//! Registry row types.

use serde::Serialize;
use sqlx::FromRow;

/// A source-control provider and the URL prefix used to address its repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Host {
    /// Host name (e.g., "github").
    pub name: String,

    /// Prefix every remote URL on this host starts with (e.g., "https://github.com/").
    #[sqlx(rename = "prefix")]
    pub remote_prefix: String,
}

impl Host {
    /// Creates a host.
    pub fn new(name: impl Into<String>, remote_prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote_prefix: remote_prefix.into(),
        }
    }

    /// Builds the remote URL of a repository on this host.
    ///
    /// Format: `{remote_prefix}{owner}/{name}.git`
    #[must_use]
    pub fn remote_url(&self, repository: &Repository) -> String {
        format!(
            "{}{}/{}.git",
            self.remote_prefix, repository.owner, repository.name
        )
    }
}

/// A tracked repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Repository {
    /// Unique, stable identifier.
    pub id: i64,

    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,

    /// Name of the [`Host`] this repository lives on.
    #[sqlx(rename = "host")]
    pub host_name: String,

    /// Commit recorded by the last successful archive.
    #[sqlx(rename = "last_commit")]
    pub last_commit_hash: String,

    /// Whether the repository is no longer tracked.
    pub deleted: bool,
}

impl Repository {
    /// Returns the repository name in "owner/name" format.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}
