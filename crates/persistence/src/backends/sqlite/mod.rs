//! SQLite backend implementation.
//!
//! Supports both in-memory databases (handy for tests and demos) and
//! file-based databases. Connections come from an r2d2 pool, and every
//! statement runs on tokio's blocking thread pool.
//!
//! # Example
//!
//! ```no_run
//! use lightbnb_persistence::backends::sqlite::SqliteBackend;
//! use lightbnb_persistence::core::ListingStorage;
//! use lightbnb_persistence::types::PropertyFilter;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SqliteBackend::open("lightbnb.db")?;
//! backend.init_schema()?;
//!
//! let filter = PropertyFilter::new().with_city("vancouver");
//! let listings = backend.search_properties(&filter, None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Schema
//!
//! ```sql
//! CREATE TABLE users (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     name TEXT NOT NULL,
//!     email TEXT NOT NULL UNIQUE,
//!     password TEXT NOT NULL
//! );
//!
//! CREATE TABLE properties (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     owner_id INTEGER NOT NULL REFERENCES users(id),
//!     cost_per_night INTEGER NOT NULL,  -- minor units
//!     city TEXT NOT NULL,
//!     ...
//! );
//!
//! CREATE TABLE reservations (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     start_date TEXT NOT NULL,  -- YYYY-MM-DD
//!     end_date TEXT NOT NULL,
//!     property_id INTEGER NOT NULL REFERENCES properties(id),
//!     guest_id INTEGER NOT NULL REFERENCES users(id)
//! );
//!
//! CREATE TABLE property_reviews (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     guest_id INTEGER NOT NULL REFERENCES users(id),
//!     property_id INTEGER NOT NULL REFERENCES properties(id),
//!     reservation_id INTEGER NOT NULL REFERENCES reservations(id),
//!     rating INTEGER NOT NULL,
//!     message TEXT
//! );
//! ```

mod backend;
mod schema;
mod storage;

pub use backend::{SqliteBackend, SqliteBackendConfig};
pub use schema::SCHEMA_VERSION;
