//! ListingStorage implementation for PostgreSQL.

use async_trait::async_trait;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

use crate::core::ListingStorage;
use crate::error::{StoreError, StoreResult};
use crate::search::{PropertyQueryBuilder, SqlDialect, SqlParam};
use crate::types::{
    DEFAULT_RESULT_LIMIT, NewProperty, NewUser, Property, PropertyFilter, PropertyListing,
    Reservation, ReservationListing, User,
};

use super::PostgresBackend;
use super::backend::{BACKEND_NAME, pg_error};

const SELECT_USER_BY_EMAIL: &str = "SELECT id, name, email, password FROM users WHERE email = $1";

const SELECT_USER_BY_ID: &str = "SELECT id, name, email, password FROM users WHERE id = $1";

const INSERT_USER: &str = "INSERT INTO users (name, email, password)
VALUES ($1, $2, $3)
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
WHERE reservations.guest_id = $1
GROUP BY reservations.id, properties.id
ORDER BY reservations.start_date, reservations.id
LIMIT $2";

const INSERT_PROPERTY: &str = "INSERT INTO properties (
    owner_id, title, description, thumbnail_photo_url, cover_photo_url,
    cost_per_night, street, city, province, post_code, country,
    parking_spaces, number_of_bathrooms, number_of_bedrooms
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
RETURNING *";

fn as_pg(param: &SqlParam) -> &(dyn ToSql + Sync) {
    match param {
        SqlParam::Text(s) => s,
        SqlParam::Integer(i) => i,
    }
}

fn user_from_row(row: &Row) -> Result<User, tokio_postgres::Error> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password: row.try_get("password")?,
    })
}

fn property_from_row(row: &Row) -> Result<Property, tokio_postgres::Error> {
    Ok(Property {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        thumbnail_photo_url: row.try_get("thumbnail_photo_url")?,
        cover_photo_url: row.try_get("cover_photo_url")?,
        cost_per_night: row.try_get("cost_per_night")?,
        street: row.try_get("street")?,
        city: row.try_get("city")?,
        province: row.try_get("province")?,
        post_code: row.try_get("post_code")?,
        country: row.try_get("country")?,
        parking_spaces: row.try_get("parking_spaces")?,
        number_of_bathrooms: row.try_get("number_of_bathrooms")?,
        number_of_bedrooms: row.try_get("number_of_bedrooms")?,
    })
}

fn listing_from_row(row: &Row) -> Result<PropertyListing, tokio_postgres::Error> {
    Ok(PropertyListing {
        property: property_from_row(row)?,
        average_rating: row.try_get("average_rating")?,
    })
}

fn reservation_listing_from_row(row: &Row) -> Result<ReservationListing, tokio_postgres::Error> {
    let property = property_from_row(row)?;
    Ok(ReservationListing {
        reservation: Reservation {
            id: row.try_get("reservation_id")?,
            guest_id: row.try_get("guest_id")?,
            property_id: property.id,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
        },
        property,
        average_rating: row.try_get("average_rating")?,
    })
}

#[async_trait]
impl ListingStorage for PostgresBackend {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn get_user_with_email(&self, email: &str) -> StoreResult<Option<User>> {
        let client = self.get_client().await?;
        let row = client
            .query_opt(SELECT_USER_BY_EMAIL, &[&email])
            .await
            .map_err(|e| pg_error("get_user_with_email", e))?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| pg_error("get_user_with_email", e))
    }

    async fn get_user_with_id(&self, id: i32) -> StoreResult<Option<User>> {
        let client = self.get_client().await?;
        let row = client
            .query_opt(SELECT_USER_BY_ID, &[&id])
            .await
            .map_err(|e| pg_error("get_user_with_id", e))?;

        row.as_ref()
            .map(user_from_row)
            .transpose()
            .map_err(|e| pg_error("get_user_with_id", e))
    }

    async fn add_user(&self, user: NewUser) -> StoreResult<User> {
        let client = self.get_client().await?;
        let row = client
            .query_opt(INSERT_USER, &[&user.name, &user.email, &user.password])
            .await
            .map_err(|e| pg_error("add_user", e))?
            .ok_or_else(|| StoreError::not_found("user", &user.email))?;

        let user = user_from_row(&row).map_err(|e| pg_error("add_user", e))?;
        tracing::info!(user_id = user.id, "Added user");
        Ok(user)
    }

    async fn get_all_reservations(
        &self,
        guest_id: i32,
        limit: Option<u32>,
    ) -> StoreResult<Vec<ReservationListing>> {
        let limit = i64::from(limit.unwrap_or(DEFAULT_RESULT_LIMIT));
        tracing::debug!(guest_id, limit, "Listing reservations");

        let client = self.get_client().await?;
        let rows = client
            .query(SELECT_RESERVATIONS, &[&guest_id, &limit])
            .await
            .map_err(|e| pg_error("get_all_reservations", e))?;

        rows.iter()
            .map(reservation_listing_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| pg_error("get_all_reservations", e))
    }

    async fn search_properties(
        &self,
        filter: &PropertyFilter,
        limit: Option<u32>,
    ) -> StoreResult<Vec<PropertyListing>> {
        let query = PropertyQueryBuilder::new(SqlDialect::Postgres)
            .build_search_query(filter, limit.unwrap_or(DEFAULT_RESULT_LIMIT));
        tracing::debug!(sql = %query.sql, params = query.params.len(), "Searching properties");

        let params: Vec<&(dyn ToSql + Sync)> = query.params.iter().map(as_pg).collect();

        let client = self.get_client().await?;
        let rows = client
            .query(query.sql.as_str(), &params)
            .await
            .map_err(|e| pg_error("search_properties", e))?;

        rows.iter()
            .map(listing_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| pg_error("search_properties", e))
    }

    async fn add_property(&self, property: NewProperty) -> StoreResult<Property> {
        let client = self.get_client().await?;
        let row = client
            .query_opt(
                INSERT_PROPERTY,
                &[
                    &property.owner_id,
                    &property.title,
                    &property.description,
                    &property.thumbnail_photo_url,
                    &property.cover_photo_url,
                    &property.cost_per_night,
                    &property.street,
                    &property.city,
                    &property.province,
                    &property.post_code,
                    &property.country,
                    &property.parking_spaces,
                    &property.number_of_bathrooms,
                    &property.number_of_bedrooms,
                ],
            )
            .await
            .map_err(|e| pg_error("add_property", e))?
            .ok_or_else(|| StoreError::not_found("property", &property.title))?;

        let property = property_from_row(&row).map_err(|e| pg_error("add_property", e))?;
        tracing::info!(property_id = property.id, owner_id = property.owner_id, "Added property");
        Ok(property)
    }
}
