//! Database operations for the `menu_panels` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `menu_panels` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MenuPanelRow {
    pub id: i64,
    pub name: String,
    pub grid_rows: i32,
    pub grid_cols: i32,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

const PANEL_COLUMNS: &str = "id, name, grid_rows, grid_cols, sort_order, created_at";

/// Returns all panels ordered for display.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_panels(pool: &PgPool) -> Result<Vec<MenuPanelRow>, DbError> {
    let rows = sqlx::query_as::<_, MenuPanelRow>(&format!(
        "SELECT {PANEL_COLUMNS} FROM menu_panels ORDER BY sort_order, name"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single panel by id, or `None` if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_panel(pool: &PgPool, id: i64) -> Result<Option<MenuPanelRow>, DbError> {
    let row = sqlx::query_as::<_, MenuPanelRow>(&format!(
        "SELECT {PANEL_COLUMNS} FROM menu_panels WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a panel and returns the persisted row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn create_panel(
    pool: &PgPool,
    name: &str,
    grid_rows: i32,
    grid_cols: i32,
    sort_order: i32,
) -> Result<MenuPanelRow, DbError> {
    let row = sqlx::query_as::<_, MenuPanelRow>(&format!(
        "INSERT INTO menu_panels (name, grid_rows, grid_cols, sort_order) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {PANEL_COLUMNS}"
    ))
    .bind(name)
    .bind(grid_rows)
    .bind(grid_cols)
    .bind(sort_order)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Updates a panel and returns the new row, or `None` if the id does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_panel(
    pool: &PgPool,
    id: i64,
    name: &str,
    grid_rows: i32,
    grid_cols: i32,
    sort_order: i32,
) -> Result<Option<MenuPanelRow>, DbError> {
    let row = sqlx::query_as::<_, MenuPanelRow>(&format!(
        "UPDATE menu_panels \
         SET name = $2, grid_rows = $3, grid_cols = $4, sort_order = $5 \
         WHERE id = $1 \
         RETURNING {PANEL_COLUMNS}"
    ))
    .bind(id)
    .bind(name)
    .bind(grid_rows)
    .bind(grid_cols)
    .bind(sort_order)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Hard-deletes a panel; its slots cascade with it.
///
/// Returns `true` if a row was deleted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_panel(pool: &PgPool, id: i64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM menu_panels WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
