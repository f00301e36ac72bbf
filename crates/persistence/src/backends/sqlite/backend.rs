//! SQLite backend implementation.

use std::fmt::Debug;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, ErrorCode};
use serde::{Deserialize, Serialize};

use crate::core::{Backend, BackendKind};
use crate::error::{StoreError, StoreResult};

use super::schema;

pub(super) const BACKEND_NAME: &str = "sqlite";

/// SQLite backend for the listing tables.
pub struct SqliteBackend {
    pool: Pool<SqliteConnectionManager>,
    config: SqliteBackendConfig,
    is_memory: bool,
}

impl Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("config", &self.config)
            .field("is_memory", &self.is_memory)
            .field("pool_size", &self.pool.state().connections)
            .finish_non_exhaustive()
    }
}

/// Configuration for the SQLite backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteBackendConfig {
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of idle connections.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Time to wait for a pooled connection, in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,

    /// Use WAL journaling for file databases.
    #[serde(default = "default_true")]
    pub enable_wal: bool,

    /// Enforce foreign key constraints.
    #[serde(default = "default_true")]
    pub enable_foreign_keys: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout_ms() -> u64 {
    30000
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for SqliteBackendConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_ms: default_connection_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            enable_wal: true,
            enable_foreign_keys: true,
        }
    }
}

/// Maps a rusqlite error onto the store taxonomy.
pub(crate) fn sqlite_error(operation: &str, e: rusqlite::Error) -> StoreError {
    let classified = match &e {
        rusqlite::Error::SqliteFailure(failure, message) => {
            let message = message.clone().unwrap_or_else(|| e.to_string());
            match failure.code {
                ErrorCode::ConstraintViolation => {
                    Some(StoreError::constraint(BACKEND_NAME, None, message))
                }
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                    Some(StoreError::timeout(BACKEND_NAME, operation, message))
                }
                ErrorCode::CannotOpen | ErrorCode::NotADatabase => {
                    Some(StoreError::connection(BACKEND_NAME, message))
                }
                _ => None,
            }
        }
        _ => None,
    };

    let err = classified
        .unwrap_or_else(|| StoreError::with_source(BACKEND_NAME, format!("{} failed", operation), e));
    tracing::warn!(operation, kind = %err.kind(), "SQLite operation failed: {}", err);
    err
}

impl SqliteBackend {
    /// Creates a new in-memory SQLite backend with the schema in place.
    ///
    /// The pool is pinned to a single long-lived connection, since every
    /// new in-memory connection would see an empty database.
    pub fn in_memory() -> StoreResult<Self> {
        let backend = Self::with_config(":memory:", SqliteBackendConfig::default())?;
        backend.init_schema()?;
        Ok(backend)
    }

    /// Opens or creates a file-based SQLite database.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::with_config(path, SqliteBackendConfig::default())
    }

    /// Creates a backend with custom configuration.
    pub fn with_config<P: AsRef<Path>>(path: P, config: SqliteBackendConfig) -> StoreResult<Self> {
        let is_memory = path.as_ref().to_string_lossy() == ":memory:";

        let busy_timeout = Duration::from_millis(u64::from(config.busy_timeout_ms));
        let enable_foreign_keys = config.enable_foreign_keys;
        let manager = if is_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path.as_ref())
        }
        .with_init(move |conn: &mut Connection| {
            conn.busy_timeout(busy_timeout)?;
            if enable_foreign_keys {
                conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            }
            Ok(())
        });

        let mut builder = Pool::builder()
            .connection_timeout(Duration::from_millis(config.connection_timeout_ms));
        builder = if is_memory {
            builder
                .max_size(1)
                .min_idle(Some(1))
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            builder
                .max_size(config.max_connections.max(1))
                .min_idle(Some(config.min_connections.min(config.max_connections)))
        };

        let pool = builder
            .build(manager)
            .map_err(|e| StoreError::connection(BACKEND_NAME, e.to_string()))?;

        let backend = Self {
            pool,
            config,
            is_memory,
        };
        backend.configure_journal()?;

        tracing::info!(
            path = %path.as_ref().display(),
            in_memory = is_memory,
            "Opened SQLite listing store"
        );

        Ok(backend)
    }

    /// Initialize the database schema.
    pub fn init_schema(&self) -> StoreResult<()> {
        let conn = self.get_connection()?;
        schema::initialize_schema(&conn)
    }

    fn get_connection(&self) -> StoreResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| StoreError::connection(BACKEND_NAME, e.to_string()))
    }

    fn configure_journal(&self) -> StoreResult<()> {
        if self.config.enable_wal && !self.is_memory {
            let conn = self.get_connection()?;
            let mode: String = conn
                .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
                .map_err(|e| sqlite_error("enable WAL", e))?;
            tracing::debug!(journal_mode = %mode, "Configured SQLite journal");
        }
        Ok(())
    }

    /// Runs `f` on a pooled connection on the blocking thread pool.
    pub(crate) async fn with_connection<T, F>(&self, operation: &'static str, f: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| StoreError::connection(BACKEND_NAME, e.to_string()))?;
            f(&*conn)
        })
        .await
        .map_err(|e| StoreError::with_source(BACKEND_NAME, format!("{} task failed", operation), e))?
    }

    /// Returns whether this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &SqliteBackendConfig {
        &self.config
    }
}

#[async_trait]
impl Backend for SqliteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sqlite
    }

    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.with_connection("health_check", |conn| {
            conn.query_row("SELECT 1", [], |_| Ok(()))
                .map_err(|e| sqlite_error("health_check", e))
        })
        .await
    }

    async fn initialize(&self) -> StoreResult<()> {
        self.with_connection("initialize", schema::initialize_schema)
            .await
    }
}
