//! PostgreSQL schema definitions and migrations.

use tokio_postgres::Transaction;

use crate::error::StoreResult;

use super::backend::pg_error;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Creates the listing tables if needed. Safe to run repeatedly.
///
/// Runs in one transaction; a failed statement rolls every table back.
pub async fn initialize_schema(client: &mut deadpool_postgres::Client) -> StoreResult<()> {
    let tx = client
        .transaction()
        .await
        .map_err(|e| pg_error("begin schema", e))?;
    let current_version = get_schema_version(&tx).await?;

    if current_version == 0 {
        create_schema_v1(&tx).await?;
        set_schema_version(&tx, SCHEMA_VERSION).await?;
    }
    tx.commit()
        .await
        .map_err(|e| pg_error("commit schema", e))?;

    if current_version == 0 {
        tracing::info!(version = SCHEMA_VERSION, "Created PostgreSQL listing schema");
    } else if current_version > SCHEMA_VERSION {
        tracing::warn!(
            found = current_version,
            supported = SCHEMA_VERSION,
            "PostgreSQL schema is newer than this build"
        );
    }

    Ok(())
}

async fn get_schema_version(tx: &Transaction<'_>) -> StoreResult<i32> {
    tx.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        &[],
    )
    .await
    .map_err(|e| pg_error("create schema_version", e))?;

    let row = tx
        .query_opt("SELECT version FROM schema_version LIMIT 1", &[])
        .await
        .map_err(|e| pg_error("read schema_version", e))?;

    match row {
        Some(row) => row
            .try_get::<_, i32>(0)
            .map_err(|e| pg_error("read schema_version", e)),
        None => Ok(0),
    }
}

async fn set_schema_version(tx: &Transaction<'_>, version: i32) -> StoreResult<()> {
    tx.execute("DELETE FROM schema_version", &[])
        .await
        .map_err(|e| pg_error("clear schema_version", e))?;

    tx.execute("INSERT INTO schema_version (version) VALUES ($1)", &[&version])
        .await
        .map_err(|e| pg_error("set schema_version", e))?;

    Ok(())
}

async fn create_schema_v1(tx: &Transaction<'_>) -> StoreResult<()> {
    tx.batch_execute(
        "
        CREATE TABLE IF NOT EXISTS users (
            id SERIAL PRIMARY KEY NOT NULL,
            name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL UNIQUE,
            password VARCHAR(255) NOT NULL
        );

        CREATE TABLE IF NOT EXISTS properties (
            id SERIAL PRIMARY KEY NOT NULL,
            owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title VARCHAR(255) NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            thumbnail_photo_url VARCHAR(255) NOT NULL,
            cover_photo_url VARCHAR(255) NOT NULL,
            cost_per_night INTEGER NOT NULL DEFAULT 0,
            parking_spaces INTEGER NOT NULL DEFAULT 0,
            number_of_bathrooms INTEGER NOT NULL DEFAULT 0,
            number_of_bedrooms INTEGER NOT NULL DEFAULT 0,
            country VARCHAR(255) NOT NULL,
            street VARCHAR(255) NOT NULL,
            city VARCHAR(255) NOT NULL,
            province VARCHAR(255) NOT NULL,
            post_code VARCHAR(255) NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_properties_city ON properties(city);
        CREATE INDEX IF NOT EXISTS idx_properties_owner ON properties(owner_id);

        CREATE TABLE IF NOT EXISTS reservations (
            id SERIAL PRIMARY KEY NOT NULL,
            start_date DATE NOT NULL,
            end_date DATE NOT NULL,
            property_id INTEGER NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
            guest_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_reservations_guest ON reservations(guest_id);

        CREATE TABLE IF NOT EXISTS property_reviews (
            id SERIAL PRIMARY KEY NOT NULL,
            guest_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            property_id INTEGER NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
            reservation_id INTEGER NOT NULL REFERENCES reservations(id) ON DELETE CASCADE,
            rating INTEGER NOT NULL DEFAULT 0,
            message TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_property_reviews_property ON property_reviews(property_id);
        ",
    )
    .await
    .map_err(|e| pg_error("create schema", e))
}
