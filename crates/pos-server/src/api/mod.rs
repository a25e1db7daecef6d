mod drivers;
mod geocode;
mod items;
mod modifiers;
mod orders;
mod panels;
mod reports;
mod store;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::request_id;
use crate::store_location::StoreLocator;
use pos_geocode::GeocodeService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub geocode: Arc<GeocodeService>,
    pub store: Arc<StoreLocator>,
    pub tax_rate: Decimal,
}

/// Error body shared by every endpoint: `{"error": "<message>"}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

pub(super) fn map_db_error(error: &pos_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database operation failed");
    ApiError::internal("database operation failed")
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/geocode", get(geocode::search))
        .route("/api/store", get(store::get_store).put(store::put_store))
        .route(
            "/api/items",
            get(items::list_items).post(items::create_item),
        )
        .route(
            "/api/items/{id}",
            put(items::update_item).delete(items::delete_item),
        )
        .route(
            "/api/items/{id}/modifiers",
            get(items::list_item_modifiers).put(items::put_item_modifiers),
        )
        .route(
            "/api/modifiers",
            get(modifiers::list_modifiers).post(modifiers::create_modifier),
        )
        .route(
            "/api/modifiers/{id}",
            put(modifiers::update_modifier).delete(modifiers::delete_modifier),
        )
        .route(
            "/api/panels",
            get(panels::list_panels).post(panels::create_panel),
        )
        .route(
            "/api/panels/{id}",
            put(panels::update_panel).delete(panels::delete_panel),
        )
        .route(
            "/api/panels/{id}/slots",
            get(panels::get_slots).put(panels::put_slots),
        )
        .route(
            "/api/drivers",
            get(drivers::list_drivers).post(drivers::create_driver),
        )
        .route(
            "/api/drivers/{id}",
            put(drivers::update_driver).delete(drivers::delete_driver),
        )
        .route(
            "/api/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route("/api/orders/{id}", get(orders::get_order))
        .route("/api/orders/{id}/status", patch(orders::update_status))
        .route("/api/orders/{id}/driver", put(orders::put_driver))
        .route("/api/reports/settlement", get(reports::settlement))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match pos_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthData {
                status: "ok",
                database: "ok",
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthData {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store_location::StoreLocator;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use pos_geocode::{GeocodeConfig, GeocodeService};
    use tower::ServiceExt;

    fn test_app(pool: PgPool) -> Router {
        // An empty provider chain: geocode tests that reach the network are
        // the wiremock suite's job, not the router's.
        let geocode = Arc::new(GeocodeService::new(Vec::new(), GeocodeConfig::default()));
        let store = Arc::new(StoreLocator::new(pool.clone()));
        build_app(AppState {
            pool,
            geocode,
            store,
            tax_rate: "0.08".parse().expect("tax rate"),
        })
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json parse")
    }

    #[test]
    fn api_error_statuses() {
        assert_eq!(
            ApiError::validation("bad").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::not_found("gone").into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::internal("boom").into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_reports_ok(pool: PgPool) {
        let response = test_app(pool)
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn geocode_blank_query_returns_empty_array(pool: PgPool) {
        let response = test_app(pool)
            .oneshot(
                Request::builder()
                    .uri("/api/geocode?q=%20%20")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn store_roundtrip(pool: PgPool) {
        let app = test_app(pool);

        let put = Request::builder()
            .method("PUT")
            .uri("/api/store")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "name": "Fishtown Slice House",
                    "address": "100 E Girard Ave",
                    "city": "Philadelphia",
                    "state": "PA",
                    "zip": "19125",
                    "lat": 39.9690,
                    "lon": -75.1337
                })
                .to_string(),
            ))
            .expect("request");
        let response = app.clone().oneshot(put).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/store")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["name"], "Fishtown Slice House");
        assert!((json["lat"].as_f64().unwrap() - 39.9690).abs() < 1e-9);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn put_store_rejects_out_of_range_latitude(pool: PgPool) {
        let put = Request::builder()
            .method("PUT")
            .uri("/api/store")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({
                    "name": "Store", "address": "", "city": "", "state": "", "zip": "",
                    "lat": 120.0, "lon": -75.0
                })
                .to_string(),
            ))
            .expect("request");
        let response = test_app(pool).oneshot(put).await.expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    async fn seed_panel(pool: &PgPool) -> i64 {
        pos_db::create_panel(pool, "Pizzas", 4, 6, 0)
            .await
            .expect("panel")
            .id
    }

    fn put_slots_request(panel_id: i64, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(format!("/api/panels/{panel_id}/slots"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn put_slots_rejects_non_array_payload(pool: PgPool) {
        let panel_id = seed_panel(&pool).await;
        let response = test_app(pool)
            .oneshot(put_slots_request(
                panel_id,
                serde_json::json!({"slots": "not an array"}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "slots must be an array");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn put_slots_rejects_negative_index(pool: PgPool) {
        let panel_id = seed_panel(&pool).await;
        let response = test_app(pool)
            .oneshot(put_slots_request(
                panel_id,
                serde_json::json!({"slots": [{"rowIndex": -1, "colIndex": 0}]}),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn put_slots_normalizes_and_returns_camel_case(pool: PgPool) {
        let panel_id = seed_panel(&pool).await;
        let app = test_app(pool);

        let response = app
            .clone()
            .oneshot(put_slots_request(
                panel_id,
                serde_json::json!({"slots": [
                    {"rowIndex": 0, "colIndex": 0, "rowSpan": 0, "labelOverride": "  Lg  "},
                    {"rowIndex": 0, "colIndex": 1}
                ]}),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let slots = json.as_array().expect("array");
        assert_eq!(slots.len(), 2);
        // rowSpan 0 persisted as 1; blank-adjacent label trimmed.
        assert_eq!(slots[0]["rowSpan"], 1);
        assert_eq!(slots[0]["labelOverride"], "Lg");
        assert_eq!(slots[0]["panelId"], panel_id);
        assert_eq!(slots[1]["itemId"], serde_json::Value::Null);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/panels/{panel_id}/slots"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().map(Vec::len), Some(2));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn put_slots_unknown_panel_is_404(pool: PgPool) {
        let response = test_app(pool)
            .oneshot(put_slots_request(9999, serde_json::json!({"slots": []})))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_order_prices_lines_server_side(pool: PgPool) {
        let item = pos_db::create_menu_item(&pool, "Large Cheese", "10.00".parse().unwrap(), "pizza")
            .await
            .expect("item");
        let modifier =
            pos_db::create_modifier(&pool, "Extra Cheese", "1.50".parse().unwrap(), 0)
                .await
                .expect("modifier");
        pos_db::replace_item_modifiers(&pool, item.id, &[modifier.id])
            .await
            .expect("link");

        let response = test_app(pool)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/orders")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "order_type": "pickup",
                            "customer_name": "Pat",
                            "items": [
                                {"item_id": item.id, "quantity": 2, "modifier_ids": [modifier.id]}
                            ]
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        // (10.00 + 1.50) * 2 = 23.00, 8% tax = 1.84, total 24.84.
        assert_eq!(json["subtotal"], "23.00");
        assert_eq!(json["tax"], "1.84");
        assert_eq!(json["total"], "24.84");
        assert_eq!(json["status"], "open");
        assert_eq!(json["items"][0]["quantity"], 2);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_order_rejects_unknown_item(pool: PgPool) {
        let response = test_app(pool)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/orders")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({
                            "order_type": "pickup",
                            "items": [{"item_id": 424242, "quantity": 1}]
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn dispatch_requires_delivery_order(pool: PgPool) {
        let driver = pos_db::create_driver(&pool, "Sam", "215-555-0134")
            .await
            .expect("driver");
        let order = pos_db::create_order(
            &pool,
            &pos_db::NewOrder {
                order_type: "pickup".to_string(),
                customer_name: String::new(),
                customer_phone: String::new(),
                address: String::new(),
                city: String::new(),
                zip: String::new(),
                lat: None,
                lon: None,
                subtotal: "10.00".parse().unwrap(),
                tax: "0.80".parse().unwrap(),
                total: "10.80".parse().unwrap(),
            },
            &[],
        )
        .await
        .expect("order");

        let response = test_app(pool)
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/api/orders/{}/driver", order.id))
                    .header("content-type", "application/json")
                    .body(Body::from(
                        serde_json::json!({"driver_id": driver.id}).to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn settlement_rejects_malformed_date(pool: PgPool) {
        let response = test_app(pool)
            .oneshot(
                Request::builder()
                    .uri("/api/reports/settlement?date=yesterday")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
