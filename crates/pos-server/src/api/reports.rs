//! Daily settlement report.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::orders::parse_day;
use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SettlementQuery {
    /// `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SettlementResponse {
    pub date: NaiveDate,
    pub orders_completed: i64,
    pub pickup_count: i64,
    pub delivery_count: i64,
    pub gross_subtotal: Decimal,
    pub gross_tax: Decimal,
    pub gross_total: Decimal,
    pub drivers: Vec<DriverSettlementResponse>,
}

#[derive(Debug, Serialize)]
pub(super) struct DriverSettlementResponse {
    pub driver_id: i64,
    pub driver_name: String,
    pub delivery_count: i64,
    pub delivered_total: Decimal,
}

/// GET /api/reports/settlement?date=YYYY-MM-DD
pub(super) async fn settlement(
    State(state): State<AppState>,
    Query(params): Query<SettlementQuery>,
) -> Result<Json<SettlementResponse>, ApiError> {
    let day = parse_day(params.date.as_deref())?.unwrap_or_else(|| Utc::now().date_naive());

    let summary = pos_db::settlement_summary(&state.pool, day)
        .await
        .map_err(|e| map_db_error(&e))?;
    let drivers = pos_db::settlement_by_driver(&state.pool, day)
        .await
        .map_err(|e| map_db_error(&e))?;

    Ok(Json(SettlementResponse {
        date: day,
        orders_completed: summary.orders_completed,
        pickup_count: summary.pickup_count,
        delivery_count: summary.delivery_count,
        gross_subtotal: summary.gross_subtotal,
        gross_tax: summary.gross_tax,
        gross_total: summary.gross_total,
        drivers: drivers
            .into_iter()
            .map(|row| DriverSettlementResponse {
                driver_id: row.driver_id,
                driver_name: row.driver_name,
                delivery_count: row.delivery_count,
                delivered_total: row.delivered_total,
            })
            .collect(),
    }))
}
