use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use pos_geocode::GeocodeSuggestion;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeQuery {
    #[serde(default)]
    q: String,
}

/// GET /api/geocode?q=<address fragment>
///
/// Returns up to six suggestions nearest the store. A blank query returns an
/// empty array without touching the store row or the providers; a total
/// provider outage is the only error path.
pub(super) async fn search(
    State(state): State<AppState>,
    Query(params): Query<GeocodeQuery>,
) -> Result<Json<Vec<GeocodeSuggestion>>, ApiError> {
    if params.q.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }

    let store = state.store.get().await;
    match state.geocode.search(&params.q, store.point()).await {
        Ok(suggestions) => Ok(Json(suggestions)),
        Err(e) => {
            tracing::error!(error = %e, "all geocoding providers failed");
            Err(ApiError::internal("address lookup failed"))
        }
    }
}
