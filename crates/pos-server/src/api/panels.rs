//! Panel CRUD and the layout-slot replace endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use pos_core::layout::normalize_slots;

use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct PanelResponse {
    pub id: i64,
    pub name: String,
    pub grid_rows: i32,
    pub grid_cols: i32,
    pub sort_order: i32,
}

impl From<pos_db::MenuPanelRow> for PanelResponse {
    fn from(row: pos_db::MenuPanelRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            grid_rows: row.grid_rows,
            grid_cols: row.grid_cols,
            sort_order: row.sort_order,
        }
    }
}

/// Slot wire shape. The layout editor speaks camelCase.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SlotResponse {
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

impl From<pos_db::LayoutSlotRow> for SlotResponse {
    fn from(row: pos_db::LayoutSlotRow) -> Self {
        Self {
            id: row.id,
            panel_id: row.panel_id,
            row_index: row.row_index,
            col_index: row.col_index,
            row_span: row.row_span,
            col_span: row.col_span,
            item_id: row.item_id,
            label_override: row.label_override,
            sort_order: row.sort_order,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PanelPayload {
    pub name: String,
    #[serde(default = "default_grid_rows")]
    pub grid_rows: i32,
    #[serde(default = "default_grid_cols")]
    pub grid_cols: i32,
    #[serde(default)]
    pub sort_order: i32,
}

fn default_grid_rows() -> i32 {
    4
}

fn default_grid_cols() -> i32 {
    6
}

fn validate_panel(payload: &PanelPayload) -> Result<String, ApiError> {
    let name = payload.name.trim().to_owned();
    if name.is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }
    if !(1..=20).contains(&payload.grid_rows) || !(1..=20).contains(&payload.grid_cols) {
        return Err(ApiError::validation(
            "grid_rows and grid_cols must be between 1 and 20",
        ));
    }
    Ok(name)
}

/// GET /api/panels
pub(super) async fn list_panels(
    State(state): State<AppState>,
) -> Result<Json<Vec<PanelResponse>>, ApiError> {
    let rows = pos_db::list_panels(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// POST /api/panels
pub(super) async fn create_panel(
    State(state): State<AppState>,
    Json(body): Json<PanelPayload>,
) -> Result<(StatusCode, Json<PanelResponse>), ApiError> {
    let name = validate_panel(&body)?;
    let row = pos_db::create_panel(
        &state.pool,
        &name,
        body.grid_rows,
        body.grid_cols,
        body.sort_order,
    )
    .await
    .map_err(|e| map_db_error(&e))?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// PUT /api/panels/:id
pub(super) async fn update_panel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<PanelPayload>,
) -> Result<Json<PanelResponse>, ApiError> {
    let name = validate_panel(&body)?;
    let row = pos_db::update_panel(
        &state.pool,
        id,
        &name,
        body.grid_rows,
        body.grid_cols,
        body.sort_order,
    )
    .await
    .map_err(|e| map_db_error(&e))?
    .ok_or_else(|| ApiError::not_found("panel not found"))?;
    Ok(Json(row.into()))
}

/// DELETE /api/panels/:id — slots cascade with the panel.
pub(super) async fn delete_panel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deleted = pos_db::delete_panel(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("panel not found"))
    }
}

/// GET /api/panels/:panel_id/slots
pub(super) async fn get_slots(
    State(state): State<AppState>,
    Path(panel_id): Path<i64>,
) -> Result<Json<Vec<SlotResponse>>, ApiError> {
    let rows = pos_db::list_panel_slots(&state.pool, panel_id)
        .await
        .map_err(|e| map_db_error(&e))?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// PUT /api/panels/:panel_id/slots — replace the whole grid atomically.
///
/// The body is taken as raw JSON rather than a typed payload so that shape
/// problems come back as 400s with a useful message instead of a generic
/// body-rejection.
pub(super) async fn put_slots(
    State(state): State<AppState>,
    Path(panel_id): Path<i64>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Vec<SlotResponse>>, ApiError> {
    pos_db::get_panel(&state.pool, panel_id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("panel not found"))?;

    let slots_value = body.get("slots").cloned().unwrap_or(serde_json::Value::Null);
    let normalized =
        normalize_slots(&slots_value).map_err(|e| ApiError::validation(e.to_string()))?;

    let rows = pos_db::replace_panel_slots(&state.pool, panel_id, &normalized)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                ApiError::internal("layout save failed: duplicate grid cell")
            } else {
                map_db_error(&e)
            }
        })?;

    Ok(Json(rows.into_iter().map(Into::into).collect()))
}
