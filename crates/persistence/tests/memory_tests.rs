//! In-memory backend integration tests.

mod common;

use serde_json::json;

use lightbnb_persistence::backends::memory::{MemoryBackend, MemoryFixtures};
use lightbnb_persistence::core::{Backend, BackendKind, ListingStorage};
use lightbnb_persistence::error::ErrorKind;
use lightbnb_persistence::types::{NewProperty, NewReservation, NewReview, NewUser, PropertyFilter};

use common::{
    Seeded, assert_property_matches, check_city_search_on_fresh_store, check_reservations,
    check_search, init_test_logging, seed_listings,
};

async fn create_seeded_backend() -> (MemoryBackend, Seeded) {
    init_test_logging();
    let backend = MemoryBackend::new();
    let seeded = seed_listings(&backend).await;

    for planned in seeded.review_plan() {
        let reservation = backend
            .insert_reservation(NewReservation {
                guest_id: seeded.guest.id,
                property_id: planned.property_id,
                start_date: planned.start_date,
                end_date: planned.end_date,
            })
            .unwrap();
        backend
            .insert_review(NewReview {
                guest_id: seeded.guest.id,
                property_id: planned.property_id,
                reservation_id: reservation.id,
                rating: planned.rating,
                message: Some("Lovely stay".to_string()),
            })
            .unwrap();
    }

    (backend, seeded)
}

#[tokio::test]
async fn test_backend_identity() {
    let backend = MemoryBackend::new();
    assert_eq!(backend.kind(), BackendKind::Memory);
    assert_eq!(backend.name(), "memory");
    assert_eq!(backend.backend_name(), "memory");
    backend.health_check().await.unwrap();
    backend.initialize().await.unwrap();
}

#[tokio::test]
async fn test_search_properties() {
    let (backend, seeded) = create_seeded_backend().await;
    check_search(&backend, &seeded).await;
}

#[tokio::test]
async fn test_city_search_on_fresh_store() {
    let (backend, seeded) = create_seeded_backend().await;
    check_city_search_on_fresh_store(&backend, &seeded).await;
}

#[tokio::test]
async fn test_get_all_reservations() {
    let (backend, seeded) = create_seeded_backend().await;
    check_reservations(&backend, &seeded).await;
}

#[tokio::test]
async fn test_default_limit_is_ten() {
    let backend = MemoryBackend::new();
    let seeded = seed_listings(&backend).await;

    for day in 1..=12 {
        let reservation = backend
            .insert_reservation(NewReservation {
                guest_id: seeded.guest.id,
                property_id: seeded.loft.id,
                start_date: chrono::NaiveDate::from_ymd_opt(2023, 6, day).unwrap(),
                end_date: chrono::NaiveDate::from_ymd_opt(2023, 6, day + 1).unwrap(),
            })
            .unwrap();
        backend
            .insert_review(NewReview {
                guest_id: seeded.guest.id,
                property_id: seeded.loft.id,
                reservation_id: reservation.id,
                rating: 4,
                message: None,
            })
            .unwrap();
    }

    let listings = backend
        .get_all_reservations(seeded.guest.id, None)
        .await
        .unwrap();
    assert_eq!(listings.len(), 10);
}

#[tokio::test]
async fn test_user_round_trip() {
    let backend = MemoryBackend::new();
    let user = backend
        .add_user(NewUser::new("Eva Stanley", "sebastianguerra@ymail.com", "$2a$10$hash"))
        .await
        .unwrap();

    assert_eq!(
        backend
            .get_user_with_email("sebastianguerra@ymail.com")
            .await
            .unwrap(),
        Some(user.clone())
    );
    assert_eq!(backend.get_user_with_id(user.id).await.unwrap(), Some(user));

    // Email lookups are exact.
    assert_eq!(
        backend
            .get_user_with_email("SebastianGuerra@ymail.com")
            .await
            .unwrap(),
        None
    );

    let err = backend
        .add_user(NewUser::new("Copy", "sebastianguerra@ymail.com", "x"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
}

#[tokio::test]
async fn test_add_property_from_form_payload() {
    let backend = MemoryBackend::new();
    let owner = backend
        .add_user(NewUser::new("Owner", "owner@example.com", "hash"))
        .await
        .unwrap();

    let payload = json!({
        "owner_id": owner.id.to_string(),
        "title": "Speed lamp",
        "description": "description",
        "thumbnail_photo_url": "https://images.example.com/t.jpg",
        "cover_photo_url": "https://images.example.com/c.jpg",
        "cost_per_night": "93061",
        "street": "536 Namsub Highway",
        "city": "Sotboske",
        "province": "Quebec",
        "post_code": "28142",
        "country": "Canada",
        "parking_spaces": "6",
        "number_of_bathrooms": 4,
        "number_of_bedrooms": "8"
    });

    let input: NewProperty = serde_json::from_value(payload).unwrap();
    let property = backend.add_property(input.clone()).await.unwrap();
    assert!(property.id > 0);
    assert_property_matches(&property, &input);
    assert_eq!(property.owner_id, owner.id);
    assert_eq!(property.cost_per_night, 93061);
    assert_eq!(property.number_of_bathrooms, 4);
    assert_eq!(property.number_of_bedrooms, 8);

    // Unreviewed properties are not searchable.
    let results = backend
        .search_properties(&PropertyFilter::new().with_city("sotboske"), None)
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_from_fixtures() {
    let fixtures: MemoryFixtures = serde_json::from_value(json!({
        "users": [
            {"id": 1, "name": "Host", "email": "host@example.com", "password": "h"},
            {"id": 2, "name": "Guest", "email": "guest@example.com", "password": "h"}
        ],
        "properties": [{
            "id": 1, "owner_id": 1, "title": "Blank corner", "description": "",
            "thumbnail_photo_url": "t", "cover_photo_url": "c", "cost_per_night": 85234,
            "street": "651 Nami Road", "city": "Bohbatev", "province": "Alberta",
            "post_code": "83680", "country": "Canada", "parking_spaces": 6,
            "number_of_bathrooms": 4, "number_of_bedrooms": 8
        }],
        "reservations": [
            {"id": 1, "guest_id": 2, "property_id": 1, "start_date": "2018-09-11", "end_date": "2018-09-26"}
        ],
        "reviews": [
            {"id": 1, "guest_id": 2, "property_id": 1, "reservation_id": 1, "rating": 3, "message": "ok"}
        ]
    }))
    .unwrap();

    let backend = MemoryBackend::from_fixtures(fixtures).unwrap();

    let results = backend
        .search_properties(&PropertyFilter::new().with_city("bohbatev"), None)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].average_rating, Some(3.0));

    let reservations = backend.get_all_reservations(2, None).await.unwrap();
    assert_eq!(reservations.len(), 1);
    assert_eq!(reservations[0].property.title, "Blank corner");

    // Ids continue after the fixture rows.
    let user = backend
        .add_user(NewUser::new("New", "new@example.com", "h"))
        .await
        .unwrap();
    assert_eq!(user.id, 3);
}
