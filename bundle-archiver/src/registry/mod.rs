//! Registry of hosts and tracked repositories.
//!
//! The registry is owned by an external registration process. The archiver
//! only reads it, soft-deletes unreachable repositories, and advances the
//! recorded commit after a successful upload.

mod error;
mod model;
mod postgres;

pub use error::RegistryError;
pub use model::{Host, Repository};
pub use postgres::PgRegistry;

use async_trait::async_trait;

/// Storage for hosts and tracked repositories.
///
/// Every write is a single-row update; no multi-statement transactions are needed.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Loads the host with the given name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::HostNotFound`] if no such host exists.
    async fn find_host(&self, name: &str) -> Result<Host, RegistryError>;

    /// Loads all repositories on `host` that are not soft-deleted.
    async fn tracked_repositories(&self, host: &Host) -> Result<Vec<Repository>, RegistryError>;

    /// Sets the `deleted` flag of a repository. Idempotent.
    async fn mark_deleted(&self, id: i64) -> Result<(), RegistryError>;

    /// Records `hash` as the last archived commit of a repository.
    async fn set_last_commit(&self, id: i64, hash: &str) -> Result<(), RegistryError>;
}
