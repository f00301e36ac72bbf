//! SQLite schema definitions and migrations.

use rusqlite::{Connection, OptionalExtension};

use crate::error::StoreResult;

use super::backend::sqlite_error;

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Creates the listing tables if needed. Safe to run repeatedly.
///
/// Runs in one transaction; a failed statement rolls every table back.
pub fn initialize_schema(conn: &Connection) -> StoreResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| sqlite_error("begin schema", e))?;
    let current_version = get_schema_version(&tx)?;

    if current_version == 0 {
        create_schema_v1(&tx)?;
        set_schema_version(&tx, SCHEMA_VERSION)?;
    }
    tx.commit().map_err(|e| sqlite_error("commit schema", e))?;

    if current_version == 0 {
        tracing::info!(version = SCHEMA_VERSION, "Created SQLite listing schema");
    } else if current_version > SCHEMA_VERSION {
        tracing::warn!(
            found = current_version,
            supported = SCHEMA_VERSION,
            "SQLite schema is newer than this build"
        );
    }

    Ok(())
}

fn get_schema_version(conn: &Connection) -> StoreResult<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| sqlite_error("create schema_version", e))?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()
        .map_err(|e| sqlite_error("read schema_version", e))?;

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> StoreResult<()> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| sqlite_error("clear schema_version", e))?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
        .map_err(|e| sqlite_error("set schema_version", e))?;
    Ok(())
}

fn create_schema_v1(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS properties (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            thumbnail_photo_url TEXT NOT NULL,
            cover_photo_url TEXT NOT NULL,
            cost_per_night INTEGER NOT NULL DEFAULT 0,
            parking_spaces INTEGER NOT NULL DEFAULT 0,
            number_of_bathrooms INTEGER NOT NULL DEFAULT 0,
            number_of_bedrooms INTEGER NOT NULL DEFAULT 0,
            country TEXT NOT NULL,
            street TEXT NOT NULL,
            city TEXT NOT NULL,
            province TEXT NOT NULL,
            post_code TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_properties_city ON properties(city);
        CREATE INDEX IF NOT EXISTS idx_properties_owner ON properties(owner_id);

        CREATE TABLE IF NOT EXISTS reservations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            property_id INTEGER NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
            guest_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_reservations_guest ON reservations(guest_id);

        CREATE TABLE IF NOT EXISTS property_reviews (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            guest_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            property_id INTEGER NOT NULL REFERENCES properties(id) ON DELETE CASCADE,
            reservation_id INTEGER NOT NULL REFERENCES reservations(id) ON DELETE CASCADE,
            rating INTEGER NOT NULL DEFAULT 0,
            message TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_property_reviews_property ON property_reviews(property_id);
        ",
    )
    .map_err(|e| sqlite_error("create schema", e))
}
