//! Database operations for the singleton `store_settings` row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// The one row id the application ever addresses. Seeded by migration.
pub const STORE_ROW_ID: i64 = 1;

/// The `store_settings` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreSettingsRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub lat: f64,
    pub lon: f64,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted by a store-settings write. Writes are upserts keyed by
/// [`STORE_ROW_ID`]; the row is never deleted.
#[derive(Debug, Clone)]
pub struct StoreSettingsUpdate {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub lat: f64,
    pub lon: f64,
}

/// Returns the singleton store settings row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the seed row is missing, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_store_settings(pool: &PgPool) -> Result<StoreSettingsRow, DbError> {
    let row = sqlx::query_as::<_, StoreSettingsRow>(
        "SELECT id, name, address, city, state, zip, lat, lon, updated_at \
         FROM store_settings \
         WHERE id = $1",
    )
    .bind(STORE_ROW_ID)
    .fetch_optional(pool)
    .await?;

    row.ok_or(DbError::NotFound)
}

/// Upserts the singleton store settings row and returns the persisted state.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_store_settings(
    pool: &PgPool,
    update: &StoreSettingsUpdate,
) -> Result<StoreSettingsRow, DbError> {
    let row = sqlx::query_as::<_, StoreSettingsRow>(
        "INSERT INTO store_settings (id, name, address, city, state, zip, lat, lon) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (id) DO UPDATE SET \
             name       = EXCLUDED.name, \
             address    = EXCLUDED.address, \
             city       = EXCLUDED.city, \
             state      = EXCLUDED.state, \
             zip        = EXCLUDED.zip, \
             lat        = EXCLUDED.lat, \
             lon        = EXCLUDED.lon, \
             updated_at = NOW() \
         RETURNING id, name, address, city, state, zip, lat, lon, updated_at",
    )
    .bind(STORE_ROW_ID)
    .bind(&update.name)
    .bind(&update.address)
    .bind(&update.city)
    .bind(&update.state)
    .bind(&update.zip)
    .bind(update.lat)
    .bind(update.lon)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
