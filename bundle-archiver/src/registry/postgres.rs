//! Postgres-backed registry.

use super::{Host, Registry, RegistryError, Repository};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};

/// Maximum pooled connections. Writes are sequential, so a small pool suffices.
const MAX_CONNECTIONS: u32 = 4;

/// Time allowed to obtain a connection before the registry counts as unreachable.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

const FIND_HOST: &str = "SELECT name, prefix FROM hosts WHERE name = $1 LIMIT 1";

// The `repositories` table carries ORM bookkeeping columns: rows removed by
// the registration process have `deleted_at` set and must stay invisible, and
// every update stamps `updated_at`.
const TRACKED_REPOSITORIES: &str = r#"
    SELECT id, owner, name, host, last_commit, deleted
    FROM repositories
    WHERE host = $1 AND deleted = FALSE AND deleted_at IS NULL
    ORDER BY id
"#;

const MARK_DELETED: &str = r#"
    UPDATE repositories
    SET deleted = TRUE, updated_at = NOW()
    WHERE id = $1 AND deleted_at IS NULL
"#;

const SET_LAST_COMMIT: &str = r#"
    UPDATE repositories
    SET last_commit = $1, updated_at = NOW()
    WHERE id = $2 AND deleted_at IS NULL
"#;

/// Registry stored in the `hosts` and `repositories` tables.
#[derive(Debug, Clone)]
pub struct PgRegistry {
    pool: PgPool,
}

impl PgRegistry {
    /// Wraps an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the registry database.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Database`] if the database cannot be reached.
    pub async fn connect(database_url: &str) -> Result<Self, RegistryError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(database_url)
            .await?;

        info!("Connected to registry");
        Ok(Self { pool })
    }
}

#[async_trait]
impl Registry for PgRegistry {
    async fn find_host(&self, name: &str) -> Result<Host, RegistryError> {
        sqlx::query_as::<_, Host>(FIND_HOST)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RegistryError::HostNotFound {
                name: name.to_string(),
            })
    }

    async fn tracked_repositories(&self, host: &Host) -> Result<Vec<Repository>, RegistryError> {
        let repositories = sqlx::query_as::<_, Repository>(TRACKED_REPOSITORIES)
            .bind(&host.name)
            .fetch_all(&self.pool)
            .await?;

        debug!(host = %host.name, count = repositories.len(), "Loaded tracked repositories");
        Ok(repositories)
    }

    async fn mark_deleted(&self, id: i64) -> Result<(), RegistryError> {
        let result = sqlx::query(MARK_DELETED)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RegistryError::RepositoryNotFound { id });
        }
        Ok(())
    }

    async fn set_last_commit(&self, id: i64, hash: &str) -> Result<(), RegistryError> {
        let result = sqlx::query(SET_LAST_COMMIT)
            .bind(hash)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RegistryError::RepositoryNotFound { id });
        }
        Ok(())
    }
}
