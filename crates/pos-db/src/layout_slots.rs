//! Wholesale replacement of a panel's button-grid slots.

use pos_core::layout::NormalizedSlot;
use sqlx::PgPool;

use crate::DbError;

/// A row from `menu_layout_slots`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LayoutSlotRow {
    pub id: i64,
    pub panel_id: i64,
    pub row_index: i32,
    pub col_index: i32,
    pub row_span: i32,
    pub col_span: i32,
    pub item_id: Option<i64>,
    pub label_override: Option<String>,
    pub sort_order: i32,
}

const SLOT_COLUMNS: &str = "id, panel_id, row_index, col_index, row_span, col_span, item_id, \
                            label_override, sort_order";

/// Returns all slots for a panel, ordered by `(row_index, col_index)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_panel_slots(pool: &PgPool, panel_id: i64) -> Result<Vec<LayoutSlotRow>, DbError> {
    let rows = sqlx::query_as::<_, LayoutSlotRow>(&format!(
        "SELECT {SLOT_COLUMNS} FROM menu_layout_slots \
         WHERE panel_id = $1 \
         ORDER BY row_index, col_index"
    ))
    .bind(panel_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Replaces the entire slot set for `panel_id` with `slots`, atomically.
///
/// Deletes every existing slot row for the panel and inserts the new set
/// inside one transaction; any failure (including a duplicate
/// `(row_index, col_index)` pair hitting the unique index) rolls the whole
/// grid back, so no partial state is ever observable. The UI always submits
/// the complete desired grid, which is why this replaces instead of diffing.
///
/// Returns the persisted slots ordered by `(row_index, col_index)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the transaction fails; the previous grid is
/// left intact in that case.
pub async fn replace_panel_slots(
    pool: &PgPool,
    panel_id: i64,
    slots: &[NormalizedSlot],
) -> Result<Vec<LayoutSlotRow>, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM menu_layout_slots WHERE panel_id = $1")
        .bind(panel_id)
        .execute(&mut *tx)
        .await?;

    for slot in slots {
        sqlx::query(
            "INSERT INTO menu_layout_slots \
                 (panel_id, row_index, col_index, row_span, col_span, item_id, label_override, sort_order) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(panel_id)
        .bind(slot.row_index)
        .bind(slot.col_index)
        .bind(slot.row_span)
        .bind(slot.col_span)
        .bind(slot.item_id)
        .bind(slot.label_override.as_deref())
        .bind(slot.sort_order)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    list_panel_slots(pool, panel_id).await
}
