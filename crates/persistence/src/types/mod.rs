//! Core types for the persistence layer.
//!
//! - [`User`], [`Property`], [`Reservation`], [`Review`] - stored rows
//! - [`NewUser`], [`NewProperty`] - insert payloads
//! - [`PropertyListing`], [`ReservationListing`] - joined read results
//! - [`PropertyFilter`] - optional property search filters
//!
//! # Example
//!
//! ```
//! use lightbnb_persistence::types::PropertyFilter;
//!
//! let filter = PropertyFilter::new()
//!     .with_city("new york")
//!     .with_minimum_price_per_night(150.0);
//!
//! assert_eq!(filter.city_pattern().as_deref(), Some("%New york%"));
//! assert_eq!(filter.minimum_cost(), Some(15000));
//! ```

pub mod filter;
pub mod lenient;
mod records;

pub use filter::{PropertyFilter, escape_like, normalize_city, to_minor_units};
pub use records::{
    DEFAULT_RESULT_LIMIT, NewProperty, NewReservation, NewReview, NewUser, Property,
    PropertyListing, Reservation, ReservationListing, Review, User,
};
