//! Menu item CRUD and per-item modifier links.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::modifiers::ModifierResponse;
use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct ItemResponse {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub is_active: bool,
}

impl From<pos_db::MenuItemRow> for ItemResponse {
    fn from(row: pos_db::MenuItemRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            category: row.category,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ItemPayload {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

fn validate_item(payload: &ItemPayload) -> Result<String, ApiError> {
    let name = payload.name.trim().to_owned();
    if name.is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }
    if payload.price < Decimal::ZERO {
        return Err(ApiError::validation("price must not be negative"));
    }
    Ok(name)
}

/// GET /api/items
pub(super) async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let rows = pos_db::list_menu_items(&state.pool, params.include_inactive)
        .await
        .map_err(|e| map_db_error(&e))?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// POST /api/items
pub(super) async fn create_item(
    State(state): State<AppState>,
    Json(body): Json<ItemPayload>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let name = validate_item(&body)?;
    let row = pos_db::create_menu_item(&state.pool, &name, body.price, body.category.trim())
        .await
        .map_err(|e| map_db_error(&e))?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// PUT /api/items/:id
pub(super) async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ItemPayload>,
) -> Result<Json<ItemResponse>, ApiError> {
    let name = validate_item(&body)?;
    let row = pos_db::update_menu_item(
        &state.pool,
        id,
        &name,
        body.price,
        body.category.trim(),
        body.is_active,
    )
    .await
    .map_err(|e| map_db_error(&e))?
    .ok_or_else(|| ApiError::not_found("item not found"))?;
    Ok(Json(row.into()))
}

/// DELETE /api/items/:id — soft delete.
pub(super) async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deactivated = pos_db::deactivate_menu_item(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?;
    if deactivated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("item not found"))
    }
}

/// GET /api/items/:id/modifiers
pub(super) async fn list_item_modifiers(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ModifierResponse>>, ApiError> {
    let rows = pos_db::list_item_modifiers(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
pub(super) struct ItemModifiersPayload {
    pub modifier_ids: Vec<i64>,
}

/// PUT /api/items/:id/modifiers — replace the link set wholesale.
pub(super) async fn put_item_modifiers(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ItemModifiersPayload>,
) -> Result<Json<Vec<ModifierResponse>>, ApiError> {
    pos_db::get_menu_item(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("item not found"))?;

    let rows = pos_db::replace_item_modifiers(&state.pool, id, &body.modifier_ids)
        .await
        .map_err(|e| {
            if e.is_foreign_key_violation() {
                ApiError::validation("unknown modifier id")
            } else {
                map_db_error(&e)
            }
        })?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
