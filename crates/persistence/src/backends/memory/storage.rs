//! ListingStorage implementation for the in-memory backend.

use async_trait::async_trait;

use crate::core::ListingStorage;
use crate::error::StoreResult;
use crate::types::{
    DEFAULT_RESULT_LIMIT, NewProperty, NewUser, Property, PropertyFilter, PropertyListing,
    ReservationListing, User,
};

use super::backend::{BACKEND_NAME, MemoryBackend, next_id};

fn average(ratings: impl Iterator<Item = i32>) -> Option<f64> {
    let (sum, count) = ratings.fold((0i64, 0u32), |(sum, count), r| {
        (sum + i64::from(r), count + 1)
    });
    (count > 0).then(|| sum as f64 / f64::from(count))
}

/// Lower-cases ASCII only, the way SQLite `LIKE` compares text.
fn fold_city(city: &str) -> String {
    city.to_ascii_lowercase()
}

fn matches_filter(filter: &PropertyFilter, city: Option<&str>, property: &Property) -> bool {
    let cost = i64::from(property.cost_per_night);
    city.is_none_or(|c| fold_city(&property.city).contains(c))
        && filter
            .owner()
            .is_none_or(|owner| i64::from(property.owner_id) == owner)
        && filter.minimum_cost().is_none_or(|min| cost > min)
        && filter.maximum_cost().is_none_or(|max| cost < max)
}

#[async_trait]
impl ListingStorage for MemoryBackend {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn get_user_with_email(&self, email: &str) -> StoreResult<Option<User>> {
        let state = self.state.read();
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user_with_id(&self, id: i32) -> StoreResult<Option<User>> {
        Ok(self.state.read().users.get(&id).cloned())
    }

    async fn add_user(&self, user: NewUser) -> StoreResult<User> {
        let mut state = self.state.write();
        state.require_email_free(&user.email)?;

        let stored = user.into_user(next_id("users", &state.users)?);
        state.users.insert(stored.id, stored.clone());
        tracing::debug!(backend = BACKEND_NAME, user_id = stored.id, "Added user");
        Ok(stored)
    }

    async fn get_all_reservations(
        &self,
        guest_id: i32,
        limit: Option<u32>,
    ) -> StoreResult<Vec<ReservationListing>> {
        let limit = limit.unwrap_or(DEFAULT_RESULT_LIMIT) as usize;
        let state = self.state.read();

        let mut listings: Vec<ReservationListing> = state
            .reservations
            .values()
            .filter(|r| r.guest_id == guest_id)
            .filter_map(|reservation| {
                let property = state.properties.get(&reservation.property_id)?;
                let average_rating = average(state.ratings_for(property.id))?;
                Some(ReservationListing {
                    reservation: reservation.clone(),
                    property: property.clone(),
                    average_rating: Some(average_rating),
                })
            })
            .collect();

        listings.sort_by_key(|l| (l.reservation.start_date, l.reservation.id));
        listings.truncate(limit);
        Ok(listings)
    }

    async fn search_properties(
        &self,
        filter: &PropertyFilter,
        limit: Option<u32>,
    ) -> StoreResult<Vec<PropertyListing>> {
        let limit = limit.unwrap_or(DEFAULT_RESULT_LIMIT) as usize;
        let city = filter.city_term().as_deref().map(fold_city);
        let rating_floor = filter.rating_floor();
        let state = self.state.read();

        let mut listings: Vec<PropertyListing> = state
            .properties
            .values()
            .filter(|p| matches_filter(filter, city.as_deref(), p))
            .filter_map(|property| {
                let ratings = state
                    .ratings_for(property.id)
                    .filter(|r| rating_floor.is_none_or(|floor| i64::from(*r) > floor));
                let average_rating = average(ratings)?;
                Some(PropertyListing {
                    property: property.clone(),
                    average_rating: Some(average_rating),
                })
            })
            .collect();

        listings.sort_by_key(|l| (l.property.cost_per_night, l.property.id));
        listings.truncate(limit);

        tracing::debug!(
            backend = BACKEND_NAME,
            results = listings.len(),
            "Searched properties"
        );
        Ok(listings)
    }

    async fn add_property(&self, property: NewProperty) -> StoreResult<Property> {
        let mut state = self.state.write();
        state.require_user("properties", "owner_id", property.owner_id)?;

        let stored = property.into_property(next_id("properties", &state.properties)?);
        state.properties.insert(stored.id, stored.clone());
        tracing::debug!(backend = BACKEND_NAME, property_id = stored.id, "Added property");
        Ok(stored)
    }
}
