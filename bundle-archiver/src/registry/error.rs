//! Registry error types.

use thiserror::Error;

/// Errors that can occur while reading or updating the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The configured host has no row in the registry.
    #[error("Host '{name}' not found in registry")]
    HostNotFound { name: String },

    /// An update matched no repository row.
    #[error("Repository {id} not found in registry")]
    RepositoryNotFound { id: i64 },
}
