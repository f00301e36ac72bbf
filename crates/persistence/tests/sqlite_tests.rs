//! SQLite backend integration tests.
//!
//! Each test gets its own database file. Reservations and reviews are written
//! with a plain rusqlite connection, the same way the seed scripts load them.

#![cfg(feature = "sqlite")]

mod common;

use std::path::Path;

use rusqlite::{Connection, params};
use tempfile::TempDir;

use lightbnb_persistence::backends::sqlite::{SqliteBackend, SqliteBackendConfig};
use lightbnb_persistence::config::{StorageConfig, open_storage};
use lightbnb_persistence::core::{Backend, BackendKind, ListingStorage};
use lightbnb_persistence::error::ErrorKind;
use lightbnb_persistence::types::{NewUser, PropertyFilter};

use common::{
    Seeded, assert_property_matches, check_city_search_on_fresh_store, check_reservations,
    check_search, init_test_logging, new_property, seed_listings,
};

fn create_backend(dir: &TempDir) -> SqliteBackend {
    init_test_logging();
    let backend = SqliteBackend::open(dir.path().join("lightbnb.db")).expect("Failed to open SQLite");
    backend.init_schema().expect("Failed to initialize schema");
    backend
}

fn seed_reviews(path: &Path, seeded: &Seeded) {
    let conn = Connection::open(path).unwrap();
    for planned in seeded.review_plan() {
        conn.execute(
            "INSERT INTO reservations (start_date, end_date, property_id, guest_id)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                planned.start_date,
                planned.end_date,
                planned.property_id,
                seeded.guest.id
            ],
        )
        .unwrap();
        let reservation_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO property_reviews (guest_id, property_id, reservation_id, rating, message)
             VALUES (?1, ?2, ?3, ?4, 'messages')",
            params![seeded.guest.id, planned.property_id, reservation_id, planned.rating],
        )
        .unwrap();
    }
}

async fn create_seeded_backend(dir: &TempDir) -> (SqliteBackend, Seeded) {
    let backend = create_backend(dir);
    let seeded = seed_listings(&backend).await;
    seed_reviews(&dir.path().join("lightbnb.db"), &seeded);
    (backend, seeded)
}

#[tokio::test]
async fn test_backend_identity() {
    let dir = tempfile::tempdir().unwrap();
    let backend = create_backend(&dir);
    assert_eq!(backend.kind(), BackendKind::Sqlite);
    assert_eq!(backend.name(), "sqlite");
    assert!(!backend.is_memory());
    backend.health_check().await.unwrap();
}

#[tokio::test]
async fn test_schema_init_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let backend = create_backend(&dir);
    backend.init_schema().unwrap();
    backend.initialize().await.unwrap();
}

#[tokio::test]
async fn test_search_properties() {
    let dir = tempfile::tempdir().unwrap();
    let (backend, seeded) = create_seeded_backend(&dir).await;
    check_search(&backend, &seeded).await;
}

#[tokio::test]
async fn test_city_search_on_fresh_store() {
    let dir = tempfile::tempdir().unwrap();
    let (backend, seeded) = create_seeded_backend(&dir).await;
    check_city_search_on_fresh_store(&backend, &seeded).await;
}

#[tokio::test]
async fn test_get_all_reservations() {
    let dir = tempfile::tempdir().unwrap();
    let (backend, seeded) = create_seeded_backend(&dir).await;
    check_reservations(&backend, &seeded).await;
}

#[tokio::test]
async fn test_city_wildcards_match_literally() {
    let dir = tempfile::tempdir().unwrap();
    let (backend, seeded) = create_seeded_backend(&dir).await;

    let filter = PropertyFilter::new()
        .with_owner_id(seeded.owner.id)
        .with_city("van%");
    let results = backend.search_properties(&filter, None).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_user_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let backend = create_backend(&dir);

    let user = backend
        .add_user(NewUser::new("Devin Sanders", "tristanjacobs@gmail.com", "$2a$10$hash"))
        .await
        .unwrap();
    assert_eq!(user.name, "Devin Sanders");

    let found = backend
        .get_user_with_email("tristanjacobs@gmail.com")
        .await
        .unwrap();
    assert_eq!(found, Some(user.clone()));
    assert_eq!(backend.get_user_with_id(user.id).await.unwrap(), Some(user));
    assert_eq!(backend.get_user_with_id(-1).await.unwrap(), None);

    let err = backend
        .add_user(NewUser::new("Again", "tristanjacobs@gmail.com", "x"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_add_property_returns_inserted_row() {
    let dir = tempfile::tempdir().unwrap();
    let backend = create_backend(&dir);
    let owner = backend
        .add_user(NewUser::new("Host", "host@example.com", "h"))
        .await
        .unwrap();

    let input = new_property(owner.id, "Harbour view", "Vancouver", 19950);
    let property = backend.add_property(input.clone()).await.unwrap();
    assert!(property.id > 0);
    assert_property_matches(&property, &input);
}

#[tokio::test]
async fn test_add_property_rejects_unknown_owner() {
    let dir = tempfile::tempdir().unwrap();
    let backend = create_backend(&dir);

    let err = backend
        .add_property(new_property(4242, "Ghost house", "Nowhere", 1000))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConstraintViolation);
}

#[tokio::test]
async fn test_data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lightbnb.db");

    let user = {
        let backend = create_backend(&dir);
        backend
            .add_user(NewUser::new("Persisted", "persisted@example.com", "h"))
            .await
            .unwrap()
    };

    let reopened = SqliteBackend::with_config(&path, SqliteBackendConfig::default()).unwrap();
    reopened.init_schema().unwrap();
    assert_eq!(
        reopened.get_user_with_id(user.id).await.unwrap(),
        Some(user)
    );
}

#[tokio::test]
async fn test_open_storage_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig::Sqlite {
        path: dir.path().join("configured.db"),
        options: SqliteBackendConfig {
            max_connections: 2,
            ..Default::default()
        },
    };

    let storage = open_storage(&config).await.unwrap();
    let seeded = seed_listings(storage.as_ref()).await;
    assert_eq!(
        storage
            .get_user_with_email(&seeded.guest.email)
            .await
            .unwrap(),
        Some(seeded.guest)
    );
}

#[tokio::test]
async fn test_in_memory_backend() {
    let backend = SqliteBackend::in_memory().unwrap();
    assert!(backend.is_memory());
    let seeded = seed_listings(&backend).await;

    // No reviews yet, so nothing is searchable.
    let results = backend
        .search_properties(&PropertyFilter::new(), None)
        .await
        .unwrap();
    assert!(results.is_empty());
    assert!(
        backend
            .get_all_reservations(seeded.guest.id, None)
            .await
            .unwrap()
            .is_empty()
    );
}
