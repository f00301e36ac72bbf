//! Database backend implementations.
//!
//! Each backend implements [`ListingStorage`](crate::core::ListingStorage)
//! and [`Backend`](crate::core::Backend). SQL backends are gated behind
//! feature flags.
//!
//! # Available Backends
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | Memory | always | Map-backed store for tests and fixture-driven demos |
//! | SQLite | `sqlite` | Embedded database, in-memory or file-based |
//! | PostgreSQL | `postgres` | Pooled server database |
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "sqlite")]
//! use lightbnb_persistence::backends::sqlite::SqliteBackend;
//!
//! # #[cfg(feature = "sqlite")]
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // In-memory database with the schema already created
//! let backend = SqliteBackend::in_memory()?;
//!
//! // Or a file-based database
//! let backend = SqliteBackend::open("./data/lightbnb.db")?;
//! backend.init_schema()?;
//! # Ok(())
//! # }
//! ```

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;
