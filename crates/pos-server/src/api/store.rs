use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct StoreResponse {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub lat: f64,
    pub lon: f64,
}

impl From<pos_db::StoreSettingsRow> for StoreResponse {
    fn from(row: pos_db::StoreSettingsRow) -> Self {
        Self {
            name: row.name,
            address: row.address,
            city: row.city,
            state: row.state,
            zip: row.zip,
            lat: row.lat,
            lon: row.lon,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct StoreUpdateRequest {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    pub lat: f64,
    pub lon: f64,
}

/// GET /api/store
pub(super) async fn get_store(
    State(state): State<AppState>,
) -> Result<Json<StoreResponse>, ApiError> {
    let row = pos_db::get_store_settings(&state.pool)
        .await
        .map_err(|e| map_db_error(&e))?;
    Ok(Json(row.into()))
}

/// PUT /api/store
pub(super) async fn put_store(
    State(state): State<AppState>,
    Json(body): Json<StoreUpdateRequest>,
) -> Result<Json<StoreResponse>, ApiError> {
    let name = body.name.trim().to_owned();
    if name.is_empty() {
        return Err(ApiError::validation("name must not be empty"));
    }
    if !(-90.0..=90.0).contains(&body.lat) {
        return Err(ApiError::validation("lat must be between -90 and 90"));
    }
    if !(-180.0..=180.0).contains(&body.lon) {
        return Err(ApiError::validation("lon must be between -180 and 180"));
    }

    let row = pos_db::upsert_store_settings(
        &state.pool,
        &pos_db::StoreSettingsUpdate {
            name,
            address: body.address.trim().to_owned(),
            city: body.city.trim().to_owned(),
            state: body.state.trim().to_owned(),
            zip: body.zip.trim().to_owned(),
            lat: body.lat,
            lon: body.lon,
        },
    )
    .await
    .map_err(|e| map_db_error(&e))?;

    Ok(Json(row.into()))
}
