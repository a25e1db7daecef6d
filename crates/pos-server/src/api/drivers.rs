//! Driver roster CRUD.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use super::items::ListQuery;
use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct DriverResponse {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub is_active: bool,
}

impl From<pos_db::DriverRow> for DriverResponse {
    fn from(row: pos_db::DriverRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            phone: row.phone,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DriverPayload {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

/// GET /api/drivers
pub(super) async fn list_drivers(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<DriverResponse>>, ApiError> {
    let rows = pos_db::list_drivers(&state.pool, params.include_inactive)
        .await
        .map_err(|e| map_db_error(&e))?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

/// POST /api/drivers
pub(super) async fn create_driver(
    State(state): State<AppState>,
    Json(body): Json<DriverPayload>,
) -> Result<(StatusCode, Json<DriverResponse>), ApiError> {
    let name = body.name.trim().to_owned();
    if name.is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }
    let row = pos_db::create_driver(&state.pool, &name, body.phone.trim())
        .await
        .map_err(|e| map_db_error(&e))?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// PUT /api/drivers/:id
pub(super) async fn update_driver(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<DriverPayload>,
) -> Result<Json<DriverResponse>, ApiError> {
    let name = body.name.trim().to_owned();
    if name.is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }
    let row = pos_db::update_driver(&state.pool, id, &name, body.phone.trim(), body.is_active)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("driver not found"))?;
    Ok(Json(row.into()))
}

/// DELETE /api/drivers/:id — soft delete; past orders keep the reference.
pub(super) async fn delete_driver(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let deactivated = pos_db::deactivate_driver(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?;
    if deactivated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("driver not found"))
    }
}
