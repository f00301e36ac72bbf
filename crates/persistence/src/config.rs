//! Storage selection.
//!
//! [`StorageConfig`] names the backend to use and carries its settings. It
//! deserializes from an internally tagged map:
//!
//! ```json
//! { "backend": "sqlite", "path": "./data/lightbnb.db" }
//! ```
//!
//! [`open_storage`] turns a configuration into a ready-to-use
//! [`DynStorage`], creating the schema when needed.

#[cfg(feature = "sqlite")]
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backends::memory::MemoryBackend;
#[cfg(feature = "postgres")]
use crate::backends::postgres::{PostgresBackend, PostgresConfig};
#[cfg(feature = "sqlite")]
use crate::backends::sqlite::{SqliteBackend, SqliteBackendConfig};
use crate::core::{Backend, DynStorage};
use crate::error::StoreResult;

/// Errors raised while reading a storage configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The backend name is not one this crate knows.
    #[error("unknown storage backend '{0}' (expected memory, sqlite or postgres)")]
    UnknownBackend(String),

    /// The backend exists but was compiled out.
    #[error("storage backend '{backend}' requires the '{backend}' feature")]
    FeatureDisabled {
        /// Requested backend name.
        backend: String,
    },
}

/// Which store to open, and how.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Process-local maps. Nothing survives a restart.
    #[default]
    Memory,

    /// SQLite database at `path`; `":memory:"` keeps it in memory.
    #[cfg(feature = "sqlite")]
    Sqlite {
        /// Database file.
        path: PathBuf,
        /// Pool and pragma settings.
        #[serde(default)]
        options: SqliteBackendConfig,
    },

    /// PostgreSQL server.
    #[cfg(feature = "postgres")]
    Postgres(PostgresConfig),
}

impl StorageConfig {
    /// Reads the configuration from environment variables.
    ///
    /// - `LIGHTBNB_STORAGE`: `memory` (default), `sqlite` or `postgres`
    /// - `LIGHTBNB_SQLITE_PATH`: database file for `sqlite` (default: "lightbnb.db")
    /// - `LIGHTBNB_PG_*`: see `PostgresConfig::from_env`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let backend = lookup("LIGHTBNB_STORAGE")
            .map(|b| b.trim().to_ascii_lowercase())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| "memory".to_string());

        match backend.as_str() {
            "memory" => Ok(StorageConfig::Memory),
            #[cfg(feature = "sqlite")]
            "sqlite" => Ok(StorageConfig::Sqlite {
                path: lookup("LIGHTBNB_SQLITE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("lightbnb.db")),
                options: SqliteBackendConfig::default(),
            }),
            #[cfg(feature = "postgres")]
            "postgres" => Ok(StorageConfig::Postgres(PostgresConfig::from_lookup(lookup))),
            #[cfg(not(feature = "sqlite"))]
            "sqlite" => Err(ConfigError::FeatureDisabled {
                backend: backend.clone(),
            }),
            #[cfg(not(feature = "postgres"))]
            "postgres" => Err(ConfigError::FeatureDisabled {
                backend: backend.clone(),
            }),
            _ => Err(ConfigError::UnknownBackend(backend.clone())),
        }
    }

    /// Returns the backend name this configuration selects.
    pub fn backend_name(&self) -> &'static str {
        match self {
            StorageConfig::Memory => "memory",
            #[cfg(feature = "sqlite")]
            StorageConfig::Sqlite { .. } => "sqlite",
            #[cfg(feature = "postgres")]
            StorageConfig::Postgres(_) => "postgres",
        }
    }
}

/// Opens the configured backend and makes sure its schema exists.
pub async fn open_storage(config: &StorageConfig) -> StoreResult<DynStorage> {
    let storage: DynStorage = match config {
        StorageConfig::Memory => Arc::new(MemoryBackend::new()),
        #[cfg(feature = "sqlite")]
        StorageConfig::Sqlite { path, options } => {
            let backend = SqliteBackend::with_config(path, options.clone())?;
            backend.initialize().await?;
            Arc::new(backend)
        }
        #[cfg(feature = "postgres")]
        StorageConfig::Postgres(pg) => {
            let backend = PostgresBackend::new(pg.clone()).await?;
            backend.initialize().await?;
            Arc::new(backend)
        }
    };

    tracing::info!(backend = storage.backend_name(), "Opened listing storage");
    Ok(storage)
}
