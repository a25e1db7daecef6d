//! Database operations for the `drivers` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `drivers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DriverRow {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

const DRIVER_COLUMNS: &str = "id, name, phone, is_active, created_at";

/// Returns drivers ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_drivers(pool: &PgPool, include_inactive: bool) -> Result<Vec<DriverRow>, DbError> {
    let rows = sqlx::query_as::<_, DriverRow>(&format!(
        "SELECT {DRIVER_COLUMNS} FROM drivers \
         WHERE is_active = TRUE OR $1 \
         ORDER BY name"
    ))
    .bind(include_inactive)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single driver by id, or `None` if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_driver(pool: &PgPool, id: i64) -> Result<Option<DriverRow>, DbError> {
    let row = sqlx::query_as::<_, DriverRow>(&format!(
        "SELECT {DRIVER_COLUMNS} FROM drivers WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a driver and returns the persisted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn create_driver(pool: &PgPool, name: &str, phone: &str) -> Result<DriverRow, DbError> {
    let row = sqlx::query_as::<_, DriverRow>(&format!(
        "INSERT INTO drivers (name, phone) VALUES ($1, $2) RETURNING {DRIVER_COLUMNS}"
    ))
    .bind(name)
    .bind(phone)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Updates a driver and returns the new row, or `None` if the id does not
/// exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_driver(
    pool: &PgPool,
    id: i64,
    name: &str,
    phone: &str,
    is_active: bool,
) -> Result<Option<DriverRow>, DbError> {
    let row = sqlx::query_as::<_, DriverRow>(&format!(
        "UPDATE drivers \
         SET name = $2, phone = $3, is_active = $4 \
         WHERE id = $1 \
         RETURNING {DRIVER_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(phone)
    .bind(is_active)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Soft-deletes a driver; past orders keep their `driver_id` reference.
///
/// Returns `true` if a row was deactivated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn deactivate_driver(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("UPDATE drivers SET is_active = FALSE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
