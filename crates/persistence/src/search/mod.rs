//! Property search.
//!
//! - [`query_builder`] - Builds the parameterized property search statement
//!   from a [`PropertyFilter`](crate::types::PropertyFilter)

pub mod query_builder;

pub use query_builder::{PropertyQueryBuilder, SqlDialect, SqlFragment, SqlParam};
