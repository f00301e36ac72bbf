//! ListingStorage implementation for SQLite.

use async_trait::async_trait;
use rusqlite::types::ToSqlOutput;
use rusqlite::{OptionalExtension, Row, ToSql, params, params_from_iter};

use crate::core::ListingStorage;
use crate::error::{StoreError, StoreResult};
use crate::search::{PropertyQueryBuilder, SqlDialect, SqlParam};
use crate::types::{
    DEFAULT_RESULT_LIMIT, NewProperty, NewUser, Property, PropertyFilter, PropertyListing,
    Reservation, ReservationListing, User,
};

use super::SqliteBackend;
use super::backend::{BACKEND_NAME, sqlite_error};

const SELECT_USER_BY_EMAIL: &str = "SELECT id, name, email, password FROM users WHERE email = ?1";

const SELECT_USER_BY_ID: &str = "SELECT id, name, email, password FROM users WHERE id = ?1";

const INSERT_USER: &str = "INSERT INTO users (name, email, password)
VALUES (?1, ?2, ?3)
RETURNING id, name, email, password";

const SELECT_RESERVATIONS: &str = "SELECT reservations.id AS reservation_id,
    reservations.guest_id,
    reservations.start_date,
    reservations.end_date,
    properties.*,
    CAST(avg(property_reviews.rating) AS DOUBLE PRECISION) AS average_rating
FROM reservations
JOIN properties ON reservations.property_id = properties.id
JOIN property_reviews ON properties.id = property_reviews.property_id
WHERE reservations.guest_id = ?1
GROUP BY reservations.id, properties.id
ORDER BY reservations.start_date, reservations.id
LIMIT ?2";

const INSERT_PROPERTY: &str = "INSERT INTO properties (
    owner_id, title, description, thumbnail_photo_url, cover_photo_url,
    cost_per_night, street, city, province, post_code, country,
    parking_spaces, number_of_bathrooms, number_of_bedrooms
)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
RETURNING *";

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlParam::Text(s) => s.to_sql(),
            SqlParam::Integer(i) => i.to_sql(),
        }
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        password: row.get("password")?,
    })
}

fn property_from_row(row: &Row<'_>) -> rusqlite::Result<Property> {
    Ok(Property {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        thumbnail_photo_url: row.get("thumbnail_photo_url")?,
        cover_photo_url: row.get("cover_photo_url")?,
        cost_per_night: row.get("cost_per_night")?,
        street: row.get("street")?,
        city: row.get("city")?,
        province: row.get("province")?,
        post_code: row.get("post_code")?,
        country: row.get("country")?,
        parking_spaces: row.get("parking_spaces")?,
        number_of_bathrooms: row.get("number_of_bathrooms")?,
        number_of_bedrooms: row.get("number_of_bedrooms")?,
    })
}

fn listing_from_row(row: &Row<'_>) -> rusqlite::Result<PropertyListing> {
    Ok(PropertyListing {
        property: property_from_row(row)?,
        average_rating: row.get("average_rating")?,
    })
}

fn reservation_listing_from_row(row: &Row<'_>) -> rusqlite::Result<ReservationListing> {
    let property = property_from_row(row)?;
    Ok(ReservationListing {
        reservation: Reservation {
            id: row.get("reservation_id")?,
            guest_id: row.get("guest_id")?,
            property_id: property.id,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
        },
        property,
        average_rating: row.get("average_rating")?,
    })
}

#[async_trait]
impl ListingStorage for SqliteBackend {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn get_user_with_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = email.to_string();
        self.with_connection("get_user_with_email", move |conn| {
            conn.query_row(SELECT_USER_BY_EMAIL, params![email], user_from_row)
                .optional()
                .map_err(|e| sqlite_error("get_user_with_email", e))
        })
        .await
    }

    async fn get_user_with_id(&self, id: i32) -> StoreResult<Option<User>> {
        self.with_connection("get_user_with_id", move |conn| {
            conn.query_row(SELECT_USER_BY_ID, params![id], user_from_row)
                .optional()
                .map_err(|e| sqlite_error("get_user_with_id", e))
        })
        .await
    }

    async fn add_user(&self, user: NewUser) -> StoreResult<User> {
        let user = self
            .with_connection("add_user", move |conn| {
                conn.query_row(
                    INSERT_USER,
                    params![user.name, user.email, user.password],
                    user_from_row,
                )
                .optional()
                .map_err(|e| sqlite_error("add_user", e))?
                .ok_or_else(|| StoreError::not_found("user", user.email))
            })
            .await?;

        tracing::info!(user_id = user.id, "Added user");
        Ok(user)
    }

    async fn get_all_reservations(
        &self,
        guest_id: i32,
        limit: Option<u32>,
    ) -> StoreResult<Vec<ReservationListing>> {
        let limit = limit.unwrap_or(DEFAULT_RESULT_LIMIT);
        tracing::debug!(guest_id, limit, "Listing reservations");

        self.with_connection("get_all_reservations", move |conn| {
            let mut stmt = conn
                .prepare(SELECT_RESERVATIONS)
                .map_err(|e| sqlite_error("get_all_reservations", e))?;
            let rows = stmt
                .query_map(params![guest_id, i64::from(limit)], reservation_listing_from_row)
                .map_err(|e| sqlite_error("get_all_reservations", e))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| sqlite_error("get_all_reservations", e))
        })
        .await
    }

    async fn search_properties(
        &self,
        filter: &PropertyFilter,
        limit: Option<u32>,
    ) -> StoreResult<Vec<PropertyListing>> {
        let query = PropertyQueryBuilder::new(SqlDialect::Sqlite)
            .build_search_query(filter, limit.unwrap_or(DEFAULT_RESULT_LIMIT));
        tracing::debug!(sql = %query.sql, params = query.params.len(), "Searching properties");

        self.with_connection("search_properties", move |conn| {
            let mut stmt = conn
                .prepare(&query.sql)
                .map_err(|e| sqlite_error("search_properties", e))?;
            let rows = stmt
                .query_map(params_from_iter(query.params.iter()), listing_from_row)
                .map_err(|e| sqlite_error("search_properties", e))?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(|e| sqlite_error("search_properties", e))
        })
        .await
    }

    async fn add_property(&self, property: NewProperty) -> StoreResult<Property> {
        let property = self
            .with_connection("add_property", move |conn| {
                conn.query_row(
                    INSERT_PROPERTY,
                    params![
                        property.owner_id,
                        property.title,
                        property.description,
                        property.thumbnail_photo_url,
                        property.cover_photo_url,
                        property.cost_per_night,
                        property.street,
                        property.city,
                        property.province,
                        property.post_code,
                        property.country,
                        property.parking_spaces,
                        property.number_of_bathrooms,
                        property.number_of_bedrooms,
                    ],
                    property_from_row,
                )
                .optional()
                .map_err(|e| sqlite_error("add_property", e))?
                .ok_or_else(|| StoreError::not_found("property", property.title))
            })
            .await?;

        tracing::info!(property_id = property.id, owner_id = property.owner_id, "Added property");
        Ok(property)
    }
}
