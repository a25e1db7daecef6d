//! Modifier CRUD.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::items::ListQuery;
use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct ModifierResponse {
    pub id: i64,
    pub name: String,
    pub price_delta: Decimal,
    pub sort_order: i32,
    pub is_active: bool,
}

impl From<pos_db::ModifierRow> for ModifierResponse {
    fn from(row: pos_db::ModifierRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price_delta: row.price_delta,
            sort_order: row.sort_order,
            is_active: row.is_active,
        }
    }
}

/// Price deltas may be negative ("no cheese"), so unlike item prices there is
/// no sign check here.
#[derive(Debug, Deserialize)]
pub(super) struct ModifierPayload {
    pub name: String,
    #[serde(default)]
    pub price_delta: Decimal,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

fn validate_modifier(payload: &ModifierPayload) -> Result<String, ApiError> {
    let name = payload.name.trim().to_owned();
    if name.is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }
    Ok(name)
}

/// GET /api/modifiers
pub(super) async fn list_modifiers(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<ModifierResponse>>, ApiError> {
    let rows = pos_db::list_modifiers(&state.pool, params.include_inactive)
        .await
        .map_err(|e| map_db_error(&e))?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// POST /api/modifiers
pub(super) async fn create_modifier(
    State(state): State<AppState>,
    Json(body): Json<ModifierPayload>,
) -> Result<(StatusCode, Json<ModifierResponse>), ApiError> {
    let name = validate_modifier(&body)?;
    let row = pos_db::create_modifier(&state.pool, &name, body.price_delta, body.sort_order)
        .await
        .map_err(|e| map_db_error(&e))?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// PUT /api/modifiers/:id
pub(super) async fn update_modifier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ModifierPayload>,
) -> Result<Json<ModifierResponse>, ApiError> {
    let name = validate_modifier(&body)?;
    let row = pos_db::update_modifier(
        &state.pool,
        id,
        &name,
        body.price_delta,
        body.sort_order,
        body.is_active,
    )
    .await
    .map_err(|e| map_db_error(&e))?
    .ok_or_else(|| ApiError::not_found("modifier not found"))?;
    Ok(Json(row.into()))
}

/// DELETE /api/modifiers/:id — soft delete.
pub(super) async fn delete_modifier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deactivated = pos_db::deactivate_modifier(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?;
    if deactivated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("modifier not found"))
    }
}
