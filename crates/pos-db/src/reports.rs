//! Daily settlement aggregates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// One day's totals over completed orders.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SettlementSummaryRow {
    pub orders_completed: i64,
    pub pickup_count: i64,
    pub delivery_count: i64,
    pub gross_subtotal: Decimal,
    pub gross_tax: Decimal,
    pub gross_total: Decimal,
}

/// Per-driver delivery totals for one day.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DriverSettlementRow {
    pub driver_id: i64,
    pub driver_name: String,
    pub delivery_count: i64,
    pub delivered_total: Decimal,
}

/// Returns the settlement summary for orders completed on `day`.
///
/// Canceled orders are excluded; an empty day reports zeros.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn settlement_summary(
    pool: &PgPool,
    day: NaiveDate,
) -> Result<SettlementSummaryRow, DbError> {
    let row = sqlx::query_as::<_, SettlementSummaryRow>(
        "SELECT COUNT(*) AS orders_completed, \
                COUNT(*) FILTER (WHERE order_type = 'pickup') AS pickup_count, \
                COUNT(*) FILTER (WHERE order_type = 'delivery') AS delivery_count, \
                COALESCE(SUM(subtotal), 0) AS gross_subtotal, \
                COALESCE(SUM(tax), 0) AS gross_tax, \
                COALESCE(SUM(total), 0) AS gross_total \
         FROM orders \
         WHERE status = 'completed' AND DATE(closed_at) = $1",
    )
    .bind(day)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Returns per-driver delivery counts and totals for orders completed on
/// `day`, busiest driver first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn settlement_by_driver(
    pool: &PgPool,
    day: NaiveDate,
) -> Result<Vec<DriverSettlementRow>, DbError> {
    let rows = sqlx::query_as::<_, DriverSettlementRow>(
        "SELECT d.id AS driver_id, \
                d.name AS driver_name, \
                COUNT(o.id) AS delivery_count, \
                COALESCE(SUM(o.total), 0) AS delivered_total \
         FROM drivers d \
         JOIN orders o ON o.driver_id = d.id \
         WHERE o.status = 'completed' \
           AND o.order_type = 'delivery' \
           AND DATE(o.closed_at) = $1 \
         GROUP BY d.id, d.name \
         ORDER BY delivery_count DESC, d.name",
    )
    .bind(day)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
