//! Test infrastructure for the persistence layer.
//!
//! Seeds the same listings into any [`ListingStorage`] and checks the search
//! and reservation behaviour every backend must share. Reviews and
//! reservations have no storage operation, so each backend test seeds them
//! from [`Seeded::review_plan`] its own way.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Days, NaiveDate};
use lightbnb_persistence::core::ListingStorage;
use lightbnb_persistence::search::{PropertyQueryBuilder, SqlDialect, SqlParam};
use lightbnb_persistence::types::{NewProperty, NewUser, Property, PropertyFilter, User};
use tracing_subscriber::EnvFilter;

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// Installs a test subscriber once; honours `RUST_LOG`.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// An email no other test in this process will use.
pub fn unique_email(prefix: &str) -> String {
    format!(
        "{}+{}-{}@example.com",
        prefix,
        std::process::id(),
        NEXT_ID.fetch_add(1, Ordering::Relaxed)
    )
}

/// A complete property payload.
pub fn new_property(owner_id: i32, title: &str, city: &str, cost_per_night: i32) -> NewProperty {
    NewProperty {
        owner_id,
        title: title.to_string(),
        description: format!("{} description", title),
        thumbnail_photo_url: "https://images.example.com/thumb.jpg".to_string(),
        cover_photo_url: "https://images.example.com/cover.jpg".to_string(),
        cost_per_night,
        street: "123 Main St".to_string(),
        city: city.to_string(),
        province: "BC".to_string(),
        post_code: "V5K 0A1".to_string(),
        country: "Canada".to_string(),
        parking_spaces: 1,
        number_of_bathrooms: 1,
        number_of_bedrooms: 2,
    }
}

/// Checks every stored column against the insert payload.
pub fn assert_property_matches(property: &Property, input: &NewProperty) {
    assert_eq!(property.owner_id, input.owner_id);
    assert_eq!(property.title, input.title);
    assert_eq!(property.description, input.description);
    assert_eq!(property.thumbnail_photo_url, input.thumbnail_photo_url);
    assert_eq!(property.cover_photo_url, input.cover_photo_url);
    assert_eq!(property.cost_per_night, input.cost_per_night);
    assert_eq!(property.street, input.street);
    assert_eq!(property.city, input.city);
    assert_eq!(property.province, input.province);
    assert_eq!(property.post_code, input.post_code);
    assert_eq!(property.country, input.country);
    assert_eq!(property.parking_spaces, input.parking_spaces);
    assert_eq!(property.number_of_bathrooms, input.number_of_bathrooms);
    assert_eq!(property.number_of_bedrooms, input.number_of_bedrooms);
}

/// Rows created by [`seed_listings`].
#[derive(Debug, Clone)]
pub struct Seeded {
    pub owner: User,
    pub guest: User,
    /// Vancouver, 120.00 a night, ratings 5 and 4.
    pub loft: Property,
    /// North Vancouver, 250.00 a night, rating 3.
    pub cabin: Property,
    /// Vancouver (stored upper-case), 80.00 a night, ratings 2 and 4.
    pub studio: Property,
    /// Toronto, 150.00 a night, rating 5.
    pub condo: Property,
    /// Calgary, 300.00 a night, never reviewed.
    pub house: Property,
}

/// One reservation by the seeded guest, reviewed with `rating`.
#[derive(Debug, Clone, Copy)]
pub struct PlannedReview {
    pub property_id: i32,
    pub rating: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

impl Seeded {
    /// Reservations and reviews to add after [`seed_listings`].
    pub fn review_plan(&self) -> Vec<PlannedReview> {
        [
            (self.loft.id, 5, date(1, 3)),
            (self.loft.id, 4, date(2, 10)),
            (self.cabin.id, 3, date(3, 1)),
            (self.studio.id, 2, date(1, 20)),
            (self.studio.id, 4, date(4, 5)),
            (self.condo.id, 5, date(5, 12)),
        ]
        .into_iter()
        .map(|(property_id, rating, start_date)| PlannedReview {
            property_id,
            rating,
            start_date,
            end_date: start_date.checked_add_days(Days::new(3)).unwrap(),
        })
        .collect()
    }

    fn owner_filter(&self) -> PropertyFilter {
        PropertyFilter::new().with_owner_id(self.owner.id)
    }
}

async fn add_property(
    storage: &dyn ListingStorage,
    owner_id: i32,
    title: &str,
    city: &str,
    cost_per_night: i32,
) -> Property {
    storage
        .add_property(new_property(owner_id, title, city, cost_per_night))
        .await
        .unwrap()
}

/// Adds an owner, a guest and five properties through the storage trait.
pub async fn seed_listings(storage: &dyn ListingStorage) -> Seeded {
    let owner = storage
        .add_user(NewUser::new("Sue Owner", unique_email("owner"), "$2a$10$hash"))
        .await
        .unwrap();
    let guest = storage
        .add_user(NewUser::new("Gus Guest", unique_email("guest"), "$2a$10$hash"))
        .await
        .unwrap();

    let owner_id = owner.id;
    let loft = add_property(storage, owner_id, "Loft", "Vancouver", 12000).await;
    let cabin = add_property(storage, owner_id, "Cabin", "North Vancouver", 25000).await;
    let studio = add_property(storage, owner_id, "Studio", "VANCOUVER", 8000).await;
    let condo = add_property(storage, owner_id, "Condo", "Toronto", 15000).await;
    let house = add_property(storage, owner_id, "House", "Calgary", 30000).await;

    Seeded {
        owner,
        guest,
        loft,
        cabin,
        studio,
        condo,
        house,
    }
}

async fn search_ids(
    storage: &dyn ListingStorage,
    filter: &PropertyFilter,
    limit: Option<u32>,
) -> Vec<i32> {
    storage
        .search_properties(filter, limit)
        .await
        .unwrap()
        .iter()
        .map(|listing| listing.property.id)
        .collect()
}

/// Search behaviour shared by every backend, scoped to the seeded owner.
pub async fn check_search(storage: &dyn ListingStorage, seeded: &Seeded) {
    let s = seeded;

    // Only reviewed properties appear, cheapest first.
    let all = storage
        .search_properties(&s.owner_filter(), None)
        .await
        .unwrap();
    let ids: Vec<i32> = all.iter().map(|l| l.property.id).collect();
    assert_eq!(ids, vec![s.studio.id, s.loft.id, s.condo.id, s.cabin.id]);
    assert_eq!(all[0].average_rating, Some(3.0));
    assert_eq!(all[1].average_rating, Some(4.5));
    assert_eq!(all[1].property, s.loft);

    // City is a case-insensitive substring match.
    let filter = s.owner_filter().with_city("vancouver");
    assert_eq!(
        search_ids(storage, &filter, None).await,
        vec![s.studio.id, s.loft.id, s.cabin.id]
    );
    assert_eq!(
        search_ids(storage, &filter, Some(2)).await,
        vec![s.studio.id, s.loft.id]
    );

    // Price bounds are exclusive and given in dollars.
    let filter = s.owner_filter().with_minimum_price_per_night(120.0);
    assert_eq!(
        search_ids(storage, &filter, None).await,
        vec![s.condo.id, s.cabin.id]
    );
    let filter = s.owner_filter().with_maximum_price_per_night(150.0);
    assert_eq!(
        search_ids(storage, &filter, None).await,
        vec![s.studio.id, s.loft.id]
    );

    // The rating bound drops individual reviews before averaging.
    let filter = s.owner_filter().with_minimum_rating(4.0);
    let rated = storage.search_properties(&filter, None).await.unwrap();
    let ids: Vec<i32> = rated.iter().map(|l| l.property.id).collect();
    assert_eq!(ids, vec![s.loft.id, s.condo.id]);
    assert_eq!(rated[0].average_rating, Some(5.0));

    let filter = s.owner_filter().with_city("Paris");
    assert!(search_ids(storage, &filter, None).await.is_empty());
}

/// City search without an owner scope. Only valid on a store that holds
/// nothing but the seeded rows.
pub async fn check_city_search_on_fresh_store(storage: &dyn ListingStorage, seeded: &Seeded) {
    let s = seeded;
    let filter = PropertyFilter::new().with_city("vancouver");

    let fragment = PropertyQueryBuilder::new(SqlDialect::Postgres).build_search_query(&filter, 5);
    assert_eq!(
        fragment.params,
        vec![SqlParam::text("%Vancouver%"), SqlParam::Integer(5)]
    );

    // Three Vancouver listings plus Toronto and Calgary; only the three match.
    let listings = storage.search_properties(&filter, Some(5)).await.unwrap();
    let ids: Vec<i32> = listings.iter().map(|l| l.property.id).collect();
    assert_eq!(ids, vec![s.studio.id, s.loft.id, s.cabin.id]);
    assert!(listings.iter().all(|l| l.average_rating.is_some()));
    assert!(
        listings
            .windows(2)
            .all(|w| w[0].property.cost_per_night <= w[1].property.cost_per_night)
    );
    assert_eq!(listings[2].property, s.cabin);
}

/// Reservation listing behaviour shared by every backend.
pub async fn check_reservations(storage: &dyn ListingStorage, seeded: &Seeded) {
    let s = seeded;

    let listings = storage.get_all_reservations(s.guest.id, None).await.unwrap();
    let properties: Vec<i32> = listings.iter().map(|l| l.property.id).collect();
    assert_eq!(
        properties,
        vec![s.loft.id, s.studio.id, s.loft.id, s.cabin.id, s.studio.id, s.condo.id]
    );
    assert!(listings.iter().all(|l| l.reservation.guest_id == s.guest.id));
    assert_eq!(listings[0].reservation.start_date, date(1, 3));
    assert_eq!(listings[0].reservation.end_date, date(1, 6));
    assert_eq!(listings[0].average_rating, Some(4.5));
    assert_eq!(listings[1].average_rating, Some(3.0));
    assert_eq!(listings[5].average_rating, Some(5.0));

    let limited = storage.get_all_reservations(s.guest.id, Some(2)).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].reservation, listings[0].reservation);

    let none = storage.get_all_reservations(s.owner.id, None).await.unwrap();
    assert!(none.is_empty());
}
