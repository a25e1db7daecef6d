//! Database operations for the `menu_items` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `menu_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MenuItemRow {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const ITEM_COLUMNS: &str = "id, name, price, category, is_active, created_at, updated_at";

/// Returns menu items ordered by category then name. Inactive items are
/// included only when `include_inactive` is set (the admin item editor wants
/// them; the order entry screen does not).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_menu_items(
    pool: &PgPool,
    include_inactive: bool,
) -> Result<Vec<MenuItemRow>, DbError> {
    let rows = sqlx::query_as::<_, MenuItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM menu_items \
         WHERE is_active = TRUE OR $1 \
         ORDER BY category, name"
    ))
    .bind(include_inactive)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single menu item by id, or `None` if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_menu_item(pool: &PgPool, id: i64) -> Result<Option<MenuItemRow>, DbError> {
    let row = sqlx::query_as::<_, MenuItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM menu_items WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a menu item and returns the persisted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn create_menu_item(
    pool: &PgPool,
    name: &str,
    price: Decimal,
    category: &str,
) -> Result<MenuItemRow, DbError> {
    let row = sqlx::query_as::<_, MenuItemRow>(&format!(
        "INSERT INTO menu_items (name, price, category) \
         VALUES ($1, $2, $3) \
         RETURNING {ITEM_COLUMNS}"
    ))
    .bind(name)
    .bind(price)
    .bind(category)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Updates a menu item in place and returns the new row, or `None` if the id
/// does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_menu_item(
    pool: &PgPool,
    id: i64,
    name: &str,
    price: Decimal,
    category: &str,
    is_active: bool,
) -> Result<Option<MenuItemRow>, DbError> {
    let row = sqlx::query_as::<_, MenuItemRow>(&format!(
        "UPDATE menu_items \
         SET name = $2, price = $3, category = $4, is_active = $5, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {ITEM_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(price)
    .bind(category)
    .bind(is_active)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Soft-deletes a menu item. Layout slots referencing it keep their binding;
/// the order entry screen simply stops offering it.
///
/// Returns `true` if a row was deactivated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn deactivate_menu_item(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE menu_items SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
