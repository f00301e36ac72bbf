//! Core storage traits and abstractions.
//!
//! - [`Backend`] - Database driver lifecycle
//! - [`ListingStorage`] - Listing data access shared by every backend

pub mod backend;
pub mod storage;

pub use backend::{Backend, BackendKind};
pub use storage::{DynStorage, ListingStorage};
