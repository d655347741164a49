//! Database operations for the `locations` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use mshmap_core::{Coordinates, LocationRecord};

/// Input record for inserting/upserting a location.
#[derive(Debug, Clone)]
pub struct NewLocation {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: Option<f64>,
    pub city: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LocationRow {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: Option<f64>,
    pub city: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LocationRow> for LocationRecord {
    fn from(row: LocationRow) -> Self {
        let coordinates = match (row.latitude, row.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        };
        LocationRecord {
            id: row.id,
            name: row.name,
            category: row.category,
            coordinates,
            rating: row.rating,
            city: row.city,
        }
    }
}

/// Full snapshot of the location set, ordered by id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_locations(pool: &PgPool) -> Result<Vec<LocationRow>, sqlx::Error> {
    sqlx::query_as::<_, LocationRow>(
        "SELECT id, name, category, latitude, longitude, rating, city, created_at, updated_at \
         FROM locations \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await
}

/// Insert a location or refresh an existing one with the same id.
///
/// Returns `true` when the row was newly inserted.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails, including when only one of
/// latitude and longitude is set.
pub async fn upsert_location(pool: &PgPool, location: &NewLocation) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "INSERT INTO locations (id, name, category, latitude, longitude, rating, city) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (id) DO UPDATE SET \
             name       = EXCLUDED.name, \
             category   = EXCLUDED.category, \
             latitude   = EXCLUDED.latitude, \
             longitude  = EXCLUDED.longitude, \
             rating     = EXCLUDED.rating, \
             city       = EXCLUDED.city, \
             updated_at = NOW() \
         RETURNING (xmax = 0) AS is_new",
    )
    .bind(&location.id)
    .bind(&location.name)
    .bind(&location.category)
    .bind(location.latitude)
    .bind(location.longitude)
    .bind(location.rating)
    .bind(&location.city)
    .fetch_one(pool)
    .await
}
