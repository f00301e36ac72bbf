//! Map-backed storage state and seeding.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::core::{Backend, BackendKind};
use crate::error::{StoreError, StoreResult};
use crate::types::{NewReservation, NewReview, Property, Reservation, Review, User};

pub(super) const BACKEND_NAME: &str = "memory";

/// Rows to preload into a [`MemoryBackend`].
///
/// Deserializes from the same shape the application's static fixture files
/// use, e.g. `{"users": [...], "properties": [...]}`. Missing tables default
/// to empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryFixtures {
    /// Users to load.
    pub users: Vec<User>,
    /// Properties to load.
    pub properties: Vec<Property>,
    /// Reservations to load.
    pub reservations: Vec<Reservation>,
    /// Reviews to load.
    pub reviews: Vec<Review>,
}

/// In-memory listing store.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    pub(super) state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
pub(super) struct MemoryState {
    pub(super) users: BTreeMap<i32, User>,
    pub(super) properties: BTreeMap<i32, Property>,
    pub(super) reservations: BTreeMap<i32, Reservation>,
    pub(super) reviews: BTreeMap<i32, Review>,
}

/// Returns the id after the highest one in use, like a serial column.
///
/// Fails once the highest id is `i32::MAX`, as an exhausted sequence would.
pub(super) fn next_id<V>(table: &str, rows: &BTreeMap<i32, V>) -> StoreResult<i32> {
    match rows.keys().next_back() {
        None => Ok(1),
        Some(last) => last.checked_add(1).ok_or_else(|| {
            StoreError::unknown(
                BACKEND_NAME,
                format!("{} id sequence reached its maximum value", table),
            )
        }),
    }
}

fn missing_reference(table: &str, column: &str, id: i32) -> StoreError {
    StoreError::constraint(
        BACKEND_NAME,
        Some(format!("{}_{}_fkey", table, column)),
        format!("{} {} is not present in the referenced table", column, id),
    )
}

fn duplicate_key(table: &str, id: i32) -> StoreError {
    StoreError::constraint(
        BACKEND_NAME,
        Some(format!("{}_pkey", table)),
        format!("duplicate id {} in {}", id, table),
    )
}

impl MemoryState {
    pub(super) fn require_user(&self, table: &str, column: &str, id: i32) -> StoreResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(missing_reference(table, column, id))
        }
    }

    pub(super) fn require_email_free(&self, email: &str) -> StoreResult<()> {
        if self.users.values().any(|u| u.email == email) {
            Err(StoreError::constraint(
                BACKEND_NAME,
                Some("users_email_key".to_string()),
                format!("email {} is already registered", email),
            ))
        } else {
            Ok(())
        }
    }

    fn require_property(&self, table: &str, id: i32) -> StoreResult<()> {
        if self.properties.contains_key(&id) {
            Ok(())
        } else {
            Err(missing_reference(table, "property_id", id))
        }
    }

    fn require_reservation(&self, id: i32) -> StoreResult<()> {
        if self.reservations.contains_key(&id) {
            Ok(())
        } else {
            Err(missing_reference("property_reviews", "reservation_id", id))
        }
    }

    /// Ratings of every review left on a property.
    pub(super) fn ratings_for(&self, property_id: i32) -> impl Iterator<Item = i32> + '_ {
        self.reviews
            .values()
            .filter(move |r| r.property_id == property_id)
            .map(|r| r.rating)
    }
}

impl MemoryBackend {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with `fixtures`.
    ///
    /// Rows are loaded in dependency order and checked like inserts.
    pub fn from_fixtures(fixtures: MemoryFixtures) -> StoreResult<Self> {
        let backend = Self::new();
        {
            let mut state = backend.state.write();
            for user in fixtures.users {
                if state.users.contains_key(&user.id) {
                    return Err(duplicate_key("users", user.id));
                }
                state.require_email_free(&user.email)?;
                state.users.insert(user.id, user);
            }
            for property in fixtures.properties {
                if state.properties.contains_key(&property.id) {
                    return Err(duplicate_key("properties", property.id));
                }
                state.require_user("properties", "owner_id", property.owner_id)?;
                state.properties.insert(property.id, property);
            }
            for reservation in fixtures.reservations {
                if state.reservations.contains_key(&reservation.id) {
                    return Err(duplicate_key("reservations", reservation.id));
                }
                state.require_user("reservations", "guest_id", reservation.guest_id)?;
                state.require_property("reservations", reservation.property_id)?;
                state.reservations.insert(reservation.id, reservation);
            }
            for review in fixtures.reviews {
                if state.reviews.contains_key(&review.id) {
                    return Err(duplicate_key("property_reviews", review.id));
                }
                state.require_user("property_reviews", "guest_id", review.guest_id)?;
                state.require_property("property_reviews", review.property_id)?;
                state.require_reservation(review.reservation_id)?;
                state.reviews.insert(review.id, review);
            }
            tracing::info!(
                users = state.users.len(),
                properties = state.properties.len(),
                reservations = state.reservations.len(),
                reviews = state.reviews.len(),
                "Loaded in-memory fixtures"
            );
        }
        Ok(backend)
    }

    /// Inserts a reservation.
    ///
    /// Reservations are read-only through [`ListingStorage`](crate::core::ListingStorage);
    /// this exists to seed data.
    pub fn insert_reservation(&self, reservation: NewReservation) -> StoreResult<Reservation> {
        let mut state = self.state.write();
        state.require_user("reservations", "guest_id", reservation.guest_id)?;
        state.require_property("reservations", reservation.property_id)?;

        let stored = Reservation {
            id: next_id("reservations", &state.reservations)?,
            guest_id: reservation.guest_id,
            property_id: reservation.property_id,
            start_date: reservation.start_date,
            end_date: reservation.end_date,
        };
        state.reservations.insert(stored.id, stored.clone());
        Ok(stored)
    }

    /// Inserts a review.
    pub fn insert_review(&self, review: NewReview) -> StoreResult<Review> {
        let mut state = self.state.write();
        state.require_user("property_reviews", "guest_id", review.guest_id)?;
        state.require_property("property_reviews", review.property_id)?;
        state.require_reservation(review.reservation_id)?;

        let stored = Review {
            id: next_id("property_reviews", &state.reviews)?,
            guest_id: review.guest_id,
            property_id: review.property_id,
            reservation_id: review.reservation_id,
            rating: review.rating,
            message: review.message,
        };
        state.reviews.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn initialize(&self) -> StoreResult<()> {
        Ok(())
    }
}
