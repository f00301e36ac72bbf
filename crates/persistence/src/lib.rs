//! LightBnB Persistence Layer
//!
//! This crate is the data-access layer behind the LightBnB rental listings
//! application. It looks up and registers users, lists a guest's
//! reservations, searches properties by optional filters, and adds new
//! property listings.
//!
//! # Features
//!
//! - **Property search**: optional city, owner, price and rating filters,
//!   compiled into a single parameterized statement
//! - **Multiple Backends**: in-memory, SQLite and PostgreSQL behind one trait
//! - **Typed errors**: driver failures classified as connection, constraint,
//!   not-found, timeout or unknown
//!
//! # Backend Features
//!
//! ```toml
//! [dependencies]
//! lightbnb-persistence = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! - `sqlite` (default) - SQLite with in-memory and file modes
//! - `postgres` - PostgreSQL via deadpool-postgres
//!
//! The in-memory backend is always available.
//!
//! # Architecture
//!
//! - [`types`] - Row types and the property search filter
//! - [`search`] - Property search query builder
//! - [`core`] - Storage traits
//! - [`backends`] - Backend implementations
//! - [`config`] - Backend selection from serde or environment
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```
//! use lightbnb_persistence::config::{StorageConfig, open_storage};
//! use lightbnb_persistence::types::PropertyFilter;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = open_storage(&StorageConfig::from_env()?).await?;
//!
//! let filter = PropertyFilter::new()
//!     .with_city("vancouver")
//!     .with_maximum_price_per_night(300.0);
//! for listing in storage.search_properties(&filter, Some(20)).await? {
//!     println!("{} {:?}", listing.property.title, listing.average_rating);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Search
//!
//! The query builder is usable on its own:
//!
//! ```
//! use lightbnb_persistence::search::{PropertyQueryBuilder, SqlDialect, SqlParam};
//! use lightbnb_persistence::types::PropertyFilter;
//!
//! let filter = PropertyFilter::new().with_city("Vancouver");
//! let query = PropertyQueryBuilder::new(SqlDialect::Postgres).build_search_query(&filter, 5);
//!
//! assert!(query.sql.contains("WHERE properties.city ILIKE $1"));
//! assert_eq!(
//!     query.params,
//!     vec![SqlParam::text("%Vancouver%"), SqlParam::Integer(5)]
//! );
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod config;
pub mod core;
pub mod error;
pub mod search;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{ErrorKind, StoreError, StoreResult};
pub use types::{PropertyFilter, PropertyListing, ReservationListing};

// Re-export core traits
pub use core::{Backend, BackendKind, DynStorage, ListingStorage};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
