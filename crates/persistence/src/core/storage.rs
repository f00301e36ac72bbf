//! Listing storage trait.
//!
//! This module defines [`ListingStorage`], the set of operations the listing
//! application performs against its store. Every backend implements the same
//! trait, so the application picks one at construction time and holds it as
//! a [`DynStorage`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{
    NewProperty, NewUser, Property, PropertyFilter, PropertyListing, ReservationListing, User,
};

/// Shared, dynamically dispatched storage handle.
pub type DynStorage = Arc<dyn ListingStorage>;

/// Data access for users, reservations and properties.
///
/// Each call is a single round-trip that borrows a connection for its
/// duration. Nothing is retried; failures are returned as
/// [`StoreError`](crate::error::StoreError) and never as data.
///
/// # Example
///
/// ```
/// use lightbnb_persistence::backends::memory::MemoryBackend;
/// use lightbnb_persistence::core::ListingStorage;
/// use lightbnb_persistence::types::NewUser;
///
/// # async fn example() -> lightbnb_persistence::StoreResult<()> {
/// let storage = MemoryBackend::new();
/// let user = storage
///     .add_user(NewUser::new("Ada", "ada@example.com", "$2b$10$hash"))
///     .await?;
/// let found = storage.get_user_with_email("ada@example.com").await?;
/// assert_eq!(found, Some(user));
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ListingStorage: Send + Sync {
    /// Returns a human-readable name for this storage backend.
    fn backend_name(&self) -> &'static str;

    /// Looks up a user by exact, case-sensitive email.
    async fn get_user_with_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Looks up a user by id.
    async fn get_user_with_id(&self, id: i32) -> StoreResult<Option<User>>;

    /// Inserts a user and returns the stored row.
    ///
    /// # Errors
    ///
    /// * `StoreError::ConstraintViolation` - if the email is already registered
    async fn add_user(&self, user: NewUser) -> StoreResult<User>;

    /// Lists a guest's reservations with property and rating data.
    ///
    /// Rows are ordered by start date and capped at `limit`
    /// (default [`DEFAULT_RESULT_LIMIT`](crate::types::DEFAULT_RESULT_LIMIT)).
    /// Reservations of properties without reviews are not listed.
    async fn get_all_reservations(
        &self,
        guest_id: i32,
        limit: Option<u32>,
    ) -> StoreResult<Vec<ReservationListing>>;

    /// Searches properties matching `filter`, cheapest first.
    ///
    /// Each result carries the average of its matching review ratings.
    /// Properties without reviews are not listed.
    async fn search_properties(
        &self,
        filter: &PropertyFilter,
        limit: Option<u32>,
    ) -> StoreResult<Vec<PropertyListing>>;

    /// Inserts a property and returns the stored row.
    ///
    /// # Errors
    ///
    /// * `StoreError::ConstraintViolation` - if the owner does not exist
    async fn add_property(&self, property: NewProperty) -> StoreResult<Property>;
}
