//! Database operations for `modifiers` and the `item_modifiers` link table.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `modifiers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ModifierRow {
    pub id: i64,
    pub name: String,
    pub price_delta: Decimal,
    pub sort_order: i32,
    pub is_active: bool,
}

const MODIFIER_COLUMNS: &str = "id, name, price_delta, sort_order, is_active";

/// Returns modifiers ordered for display.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_modifiers(
    pool: &PgPool,
    include_inactive: bool,
) -> Result<Vec<ModifierRow>, DbError> {
    let rows = sqlx::query_as::<_, ModifierRow>(&format!(
        "SELECT {MODIFIER_COLUMNS} FROM modifiers \
         WHERE is_active = TRUE OR $1 \
         ORDER BY sort_order, name"
    ))
    .bind(include_inactive)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Inserts a modifier and returns the persisted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn create_modifier(
    pool: &PgPool,
    name: &str,
    price_delta: Decimal,
    sort_order: i32,
) -> Result<ModifierRow, DbError> {
    let row = sqlx::query_as::<_, ModifierRow>(&format!(
        "INSERT INTO modifiers (name, price_delta, sort_order) \
         VALUES ($1, $2, $3) \
         RETURNING {MODIFIER_COLUMNS}"
    ))
    .bind(name)
    .bind(price_delta)
    .bind(sort_order)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Updates a modifier and returns the new row, or `None` if the id does not
/// exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_modifier(
    pool: &PgPool,
    id: i64,
    name: &str,
    price_delta: Decimal,
    sort_order: i32,
    is_active: bool,
) -> Result<Option<ModifierRow>, DbError> {
    let row = sqlx::query_as::<_, ModifierRow>(&format!(
        "UPDATE modifiers \
         SET name = $2, price_delta = $3, sort_order = $4, is_active = $5 \
         WHERE id = $1 \
         RETURNING {MODIFIER_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(price_delta)
    .bind(sort_order)
    .bind(is_active)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Soft-deletes a modifier. Existing order lines keep their snapshots.
///
/// Returns `true` if a row was deactivated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn deactivate_modifier(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("UPDATE modifiers SET is_active = FALSE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Returns the active modifiers linked to one menu item.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_item_modifiers(pool: &PgPool, item_id: i64) -> Result<Vec<ModifierRow>, DbError> {
    let rows = sqlx::query_as::<_, ModifierRow>(
        "SELECT m.id, m.name, m.price_delta, m.sort_order, m.is_active \
         FROM modifiers m \
         JOIN item_modifiers im ON im.modifier_id = m.id \
         WHERE im.item_id = $1 AND m.is_active = TRUE \
         ORDER BY m.sort_order, m.name",
    )
    .bind(item_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Replaces the set of modifiers linked to an item, atomically.
///
/// Same wholesale delete-then-insert shape as the panel layout save: the
/// editor submits the complete desired set.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the transaction fails; the previous links are
/// left intact in that case.
pub async fn replace_item_modifiers(
    pool: &PgPool,
    item_id: i64,
    modifier_ids: &[i64],
) -> Result<Vec<ModifierRow>, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM item_modifiers WHERE item_id = $1")
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

    for modifier_id in modifier_ids {
        sqlx::query("INSERT INTO item_modifiers (item_id, modifier_id) VALUES ($1, $2)")
            .bind(item_id)
            .bind(modifier_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    list_item_modifiers(pool, item_id).await
}
