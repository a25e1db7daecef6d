//! Order entry, status flow, and driver dispatch.
//!
//! Order totals are computed server-side from the current menu prices at
//! order time; each line snapshots the item name, unit price, and chosen
//! modifiers so later menu edits never change a placed order.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{map_db_error, ApiError, AppState};

const ORDER_TYPES: [&str; 2] = ["pickup", "delivery"];
const ORDER_STATUSES: [&str; 5] = ["open", "ready", "dispatched", "completed", "canceled"];

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct CreateOrderRequest {
    pub order_type: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OrderLineRequest {
    pub item_id: i64,
    pub quantity: i32,
    #[serde(default)]
    pub modifier_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct StatusPayload {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct DispatchPayload {
    pub driver_id: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct OrdersQuery {
    pub status: Option<String>,
    /// `YYYY-MM-DD`; filters by the day the order was placed.
    pub date: Option<String>,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct OrderResponse {
    pub id: i64,
    pub order_type: String,
    pub status: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub driver_id: Option<i64>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderLineResponse>>,
}

#[derive(Debug, Serialize)]
pub(super) struct OrderLineResponse {
    pub id: i64,
    pub item_id: Option<i64>,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub modifiers: serde_json::Value,
    pub line_total: Decimal,
}

impl OrderResponse {
    fn from_row(row: pos_db::OrderRow, items: Option<Vec<pos_db::OrderItemRow>>) -> Self {
        Self {
            id: row.id,
            order_type: row.order_type,
            status: row.status,
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            address: row.address,
            city: row.city,
            zip: row.zip,
            lat: row.lat,
            lon: row.lon,
            driver_id: row.driver_id,
            subtotal: row.subtotal,
            tax: row.tax,
            total: row.total,
            placed_at: row.placed_at,
            closed_at: row.closed_at,
            items: items.map(|items| {
                items
                    .into_iter()
                    .map(|item| OrderLineResponse {
                        id: item.id,
                        item_id: item.item_id,
                        name: item.name,
                        unit_price: item.unit_price,
                        quantity: item.quantity,
                        modifiers: item.modifiers,
                        line_total: item.line_total,
                    })
                    .collect()
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/orders
pub(super) async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    if !ORDER_TYPES.contains(&body.order_type.as_str()) {
        return Err(ApiError::validation(
            "order_type must be 'pickup' or 'delivery'",
        ));
    }
    if body.order_type == "delivery" && body.address.trim().is_empty() {
        return Err(ApiError::validation("delivery orders require an address"));
    }
    if body.items.is_empty() {
        return Err(ApiError::validation("order must contain at least one item"));
    }

    let mut lines = Vec::with_capacity(body.items.len());
    let mut subtotal = Decimal::ZERO;
    for line in &body.items {
        if line.quantity < 1 {
            return Err(ApiError::validation("quantity must be at least 1"));
        }

        let item = pos_db::get_menu_item(&state.pool, line.item_id)
            .await
            .map_err(|e| map_db_error(&e))?
            .filter(|item| item.is_active)
            .ok_or_else(|| {
                ApiError::validation(format!("unknown or inactive item {}", line.item_id))
            })?;

        let available = pos_db::list_item_modifiers(&state.pool, item.id)
            .await
            .map_err(|e| map_db_error(&e))?;

        let mut unit_price = item.price;
        let mut chosen = Vec::with_capacity(line.modifier_ids.len());
        for modifier_id in &line.modifier_ids {
            let modifier = available
                .iter()
                .find(|m| m.id == *modifier_id)
                .ok_or_else(|| {
                    ApiError::validation(format!(
                        "modifier {modifier_id} is not available for item {}",
                        item.id
                    ))
                })?;
            unit_price += modifier.price_delta;
            chosen.push(serde_json::json!({
                "name": modifier.name,
                "price_delta": modifier.price_delta,
            }));
        }

        let line_total = unit_price * Decimal::from(line.quantity);
        subtotal += line_total;
        lines.push(pos_db::NewOrderItem {
            item_id: Some(item.id),
            name: item.name,
            unit_price,
            quantity: line.quantity,
            modifiers: serde_json::Value::Array(chosen),
            line_total,
        });
    }

    let tax = (subtotal * state.tax_rate).round_dp(2);
    let total = subtotal + tax;

    let order = pos_db::create_order(
        &state.pool,
        &pos_db::NewOrder {
            order_type: body.order_type,
            customer_name: body.customer_name.trim().to_owned(),
            customer_phone: body.customer_phone.trim().to_owned(),
            address: body.address.trim().to_owned(),
            city: body.city.trim().to_owned(),
            zip: body.zip.trim().to_owned(),
            lat: body.lat,
            lon: body.lon,
            subtotal,
            tax,
            total,
        },
        &lines,
    )
    .await
    .map_err(|e| map_db_error(&e))?;

    let (row, items) = pos_db::get_order(&state.pool, order.id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::internal("order vanished after create"))?;

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse::from_row(row, Some(items))),
    ))
}

/// GET /api/orders
pub(super) async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<OrdersQuery>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    if let Some(ref status) = params.status {
        if !ORDER_STATUSES.contains(&status.as_str()) {
            return Err(ApiError::validation(format!("unknown status '{status}'")));
        }
    }
    let day = parse_day(params.date.as_deref())?;

    let rows = pos_db::list_orders(&state.pool, params.status.as_deref(), day)
        .await
        .map_err(|e| map_db_error(&e))?;
    Ok(Json(
        rows.into_iter()
            .map(|row| OrderResponse::from_row(row, None))
            .collect(),
    ))
}

/// GET /api/orders/:id
pub(super) async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrderResponse>, ApiError> {
    let (row, items) = pos_db::get_order(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("order not found"))?;
    Ok(Json(OrderResponse::from_row(row, Some(items))))
}

/// PATCH /api/orders/:id/status
pub(super) async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<StatusPayload>,
) -> Result<Json<OrderResponse>, ApiError> {
    if !ORDER_STATUSES.contains(&body.status.as_str()) {
        return Err(ApiError::validation(format!(
            "unknown status '{}'",
            body.status
        )));
    }

    let row = pos_db::update_order_status(&state.pool, id, &body.status)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("order not found"))?;
    Ok(Json(OrderResponse::from_row(row, None)))
}

/// PUT /api/orders/:id/driver — dispatch a delivery order.
pub(super) async fn put_driver(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<DispatchPayload>,
) -> Result<Json<OrderResponse>, ApiError> {
    let (order, _) = pos_db::get_order(&state.pool, id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("order not found"))?;
    if order.order_type != "delivery" {
        return Err(ApiError::validation(
            "only delivery orders can be dispatched",
        ));
    }

    let driver = pos_db::get_driver(&state.pool, body.driver_id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("driver not found"))?;
    if !driver.is_active {
        return Err(ApiError::validation("driver is not active"));
    }

    let row = pos_db::assign_driver(&state.pool, id, driver.id)
        .await
        .map_err(|e| map_db_error(&e))?
        .ok_or_else(|| ApiError::not_found("order not found"))?;
    Ok(Json(OrderResponse::from_row(row, None)))
}

pub(super) fn parse_day(raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| ApiError::validation(format!("invalid date '{s}', expected YYYY-MM-DD")))
    })
    .transpose()
}
