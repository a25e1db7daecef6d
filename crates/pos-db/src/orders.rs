//! Database operations for `orders` and `order_items`.
//!
//! An order and its line items are written in one transaction. Line items
//! snapshot the menu item name, unit price, and chosen modifiers at order
//! time, so later menu edits never rewrite history.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `orders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
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
}

/// A row from the `order_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItemRow {
    pub id: i64,
    pub order_id: i64,
    pub item_id: Option<i64>,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub modifiers: serde_json::Value,
    pub line_total: Decimal,
}

/// Fields for a new order header. Totals are computed by the caller.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_type: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// One priced line for a new order.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub item_id: Option<i64>,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub modifiers: serde_json::Value,
    pub line_total: Decimal,
}

const ORDER_COLUMNS: &str = "id, order_type, status, customer_name, customer_phone, address, \
                             city, zip, lat, lon, driver_id, subtotal, tax, total, placed_at, \
                             closed_at";

const ORDER_ITEM_COLUMNS: &str = "id, order_id, item_id, name, unit_price, quantity, modifiers, \
                                  line_total";

/// Inserts an order and all of its line items in one transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the transaction fails; nothing is persisted
/// in that case.
pub async fn create_order(
    pool: &PgPool,
    order: &NewOrder,
    items: &[NewOrderItem],
) -> Result<OrderRow, DbError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "INSERT INTO orders \
             (order_type, customer_name, customer_phone, address, city, zip, lat, lon, \
              subtotal, tax, total) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(&order.order_type)
    .bind(&order.customer_name)
    .bind(&order.customer_phone)
    .bind(&order.address)
    .bind(&order.city)
    .bind(&order.zip)
    .bind(order.lat)
    .bind(order.lon)
    .bind(order.subtotal)
    .bind(order.tax)
    .bind(order.total)
    .fetch_one(&mut *tx)
    .await?;

    for item in items {
        sqlx::query(
            "INSERT INTO order_items \
                 (order_id, item_id, name, unit_price, quantity, modifiers, line_total) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(row.id)
        .bind(item.item_id)
        .bind(&item.name)
        .bind(item.unit_price)
        .bind(item.quantity)
        .bind(&item.modifiers)
        .bind(item.line_total)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(row)
}

/// Returns one order with its line items, or `None` if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn get_order(
    pool: &PgPool,
    id: i64,
) -> Result<Option<(OrderRow, Vec<OrderItemRow>)>, DbError> {
    let Some(order) = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let items = sqlx::query_as::<_, OrderItemRow>(&format!(
        "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = $1 ORDER BY id"
    ))
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some((order, items)))
}

/// Returns orders, newest first, optionally filtered by status and/or the
/// calendar day they were placed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_orders(
    pool: &PgPool,
    status: Option<&str>,
    day: Option<NaiveDate>,
) -> Result<Vec<OrderRow>, DbError> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders \
         WHERE ($1::text IS NULL OR status = $1) \
           AND ($2::date IS NULL OR DATE(placed_at) = $2) \
         ORDER BY placed_at DESC"
    ))
    .bind(status)
    .bind(day)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Sets an order's status, stamping `closed_at` when the status is terminal.
///
/// Returns the updated row, or `None` if the id does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_order_status(
    pool: &PgPool,
    id: i64,
    status: &str,
) -> Result<Option<OrderRow>, DbError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "UPDATE orders \
         SET status = $2, \
             closed_at = CASE WHEN $2 IN ('completed', 'canceled') THEN NOW() ELSE closed_at END \
         WHERE id = $1 \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Assigns a driver to an order and moves it to `dispatched`.
///
/// Returns the updated row, or `None` if the id does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails (including an unknown
/// `driver_id` hitting the foreign key).
pub async fn assign_driver(
    pool: &PgPool,
    id: i64,
    driver_id: i64,
) -> Result<Option<OrderRow>, DbError> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "UPDATE orders \
         SET driver_id = $2, status = 'dispatched' \
         WHERE id = $1 \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(id)
    .bind(driver_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
