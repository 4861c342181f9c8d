//! API routes for shop-cloud
//!
//! # Structure
//!
//! - [`health`] and [`auth`]: public
//! - [`master`]: one router per master-data module
//! - [`transaction`]: one router per transaction kind
//! - [`master_sync`]: activity feed and last-write status
//! - [`shop`]: the caller's shops and shop permissions
//!
//! Everything except the public routes sits behind the JWT middleware.

pub mod auth;
pub mod health;
pub mod master;
pub mod master_sync;
pub mod query;
pub mod shop;
pub mod transaction;

use axum::routing::get;
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    let s = state.services.clone();

    let business = Router::new()
        // payment
        .merge(master::router(s.bank_master.clone()))
        .merge(master::router(s.book_bank.clone()))
        .merge(master::router(s.qr_payment.clone()))
        // restaurant
        .merge(master::router(s.zone.clone()))
        .merge(master::router(s.table.clone()))
        .merge(master::router(s.printer.clone()))
        .merge(master::router(s.kitchen.clone()))
        .merge(master::router(s.device.clone()))
        .merge(master::router(s.staff.clone()))
        // shop and product
        .merge(master::router(s.employee.clone()))
        .merge(master::router(s.product_category.clone()))
        .merge(master::router(s.order_type.clone()))
        // transactions
        .merge(transaction::router(s.sale_invoice.clone()))
        .merge(transaction::router(s.sale_invoice_return.clone()))
        .merge(transaction::router(s.purchase.clone()))
        .merge(transaction::router(s.purchase_return.clone()))
        .merge(transaction::router(s.stock_adjustment.clone()))
        .merge(transaction::router(s.stock_transfer.clone()))
        .merge(transaction::router(s.stock_pickup_product.clone()))
        .merge(transaction::router(s.purchase_order.clone()))
        .merge(transaction::router(s.paid.clone()))
        .merge(master_sync::router())
        .merge(shop::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(auth::router())
        .merge(business)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::create_token;
    use crate::config::Config;
    use crate::db::DbService;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const SECRET: &str = "test-secret";

    async fn app() -> Router {
        let db = DbService::in_memory().await.unwrap();
        let config = Config {
            jwt_secret: SECRET.into(),
            ..Config::default()
        };
        create_router(AppState::new(&config, db.pool))
    }

    fn bearer(shop_id: &str) -> String {
        format!("Bearer {}", create_token(shop_id, "admin", SECRET).unwrap())
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        shop_id: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(shop) = shop_id {
            builder = builder.header("Authorization", bearer(shop));
        }
        let req = match body {
            Some(b) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = app().await;
        let (status, body) = call(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "ok");
    }

    #[tokio::test]
    async fn test_business_routes_require_token() {
        let app = app().await;
        let (status, body) = call(&app, "GET", "/payment/bankmaster", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], 1001);
    }

    #[tokio::test]
    async fn test_master_crud_flow() {
        let app = app().await;
        let bank = json!({"code": "KBANK", "names": [{"code": "th", "name": "กสิกรไทย"}]});

        let (status, body) =
            call(&app, "POST", "/payment/bankmaster", Some("s1"), Some(bank.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        let id = body["id"].as_str().unwrap().to_string();

        let (status, body) =
            call(&app, "POST", "/payment/bankmaster", Some("s1"), Some(bank)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "Code is exists");

        let (status, body) =
            call(&app, "GET", &format!("/payment/bankmaster/{id}"), Some("s1"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["code"], "KBANK");
        assert_eq!(body["data"]["guidfixed"], id.as_str());

        let (status, _) =
            call(&app, "GET", &format!("/payment/bankmaster/{id}"), Some("s2"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(
            &app,
            "GET",
            "/payment/bankmaster?q=kban&page=1&limit=10",
            Some("s1"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["total"], 1);
        assert_eq!(body["pagination"]["perPage"], 10);

        let (status, body) = call(
            &app,
            "PUT",
            &format!("/payment/bankmaster/{id}"),
            Some("s1"),
            Some(json!({"code": "KBANK", "logo": "k.png"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id.as_str());

        let (_, body) =
            call(&app, "GET", "/payment/bankmaster/code/KBANK", Some("s1"), None).await;
        assert_eq!(body["data"]["logo"], "k.png");

        let (status, _) =
            call(&app, "DELETE", &format!("/payment/bankmaster/{id}"), Some("s1"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) =
            call(&app, "DELETE", &format!("/payment/bankmaster/{id}"), Some("s1"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "document not found");
    }

    #[tokio::test]
    async fn test_search_with_huge_page() {
        let app = app().await;
        let (status, body) = call(
            &app,
            "GET",
            "/payment/bankmaster?page=9223372036854775807",
            Some("s1"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!([]));
        assert_eq!(body["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn test_bulk_and_list() {
        let app = app().await;
        let (status, body) = call(
            &app,
            "POST",
            "/restaurant/kitchen/bulk",
            Some("s1"),
            Some(json!([
                {"code": "K1", "groupnumber": 1},
                {"code": "K2", "groupnumber": 2},
                {"code": "K2", "groupnumber": 2}
            ])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["created"], json!(["K1", "K2"]));
        assert_eq!(body["payloadDuplicate"], json!(["K2"]));

        let (_, body) = call(
            &app,
            "GET",
            "/restaurant/kitchen/list?group-number=2",
            Some("s1"),
            None,
        )
        .await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["code"], "K2");

        let guid = body["data"][0]["guidfixed"].as_str().unwrap().to_string();
        let (status, body) = call(
            &app,
            "DELETE",
            "/restaurant/kitchen",
            Some("s1"),
            Some(json!([guid])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_transaction_create_returns_docno() {
        let app = app().await;
        let (status, body) = call(
            &app,
            "POST",
            "/transaction/sale-invoice",
            Some("s1"),
            Some(json!({"docdatetime": "2024-05-01T10:00:00Z", "custcode": "C1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["docno"], "SI2024050100001");

        let (status, body) = call(
            &app,
            "GET",
            "/transaction/sale-invoice/docno/SI2024050100001",
            Some("s1"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["transflag"], 44);

        let (status, body) = call(
            &app,
            "POST",
            "/transaction/sale-invoice",
            Some("s1"),
            Some(json!({"docdatetime": "2024-05-01T10:00:00Z", "ispos": true})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "docno is required");
    }

    #[tokio::test]
    async fn test_login_then_call() {
        let app = app().await;
        call(
            &app,
            "POST",
            "/shop/employee",
            Some("s1"),
            Some(json!({"code": "cashier", "name": "Cashier", "password": "secret123"})),
        )
        .await;

        let (status, body) = call(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({"shopid": "s1", "username": "cashier", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let req = Request::builder()
            .uri("/shop/employee/code/cashier")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"]["name"], "Cashier");
        assert!(body["data"].get("password").is_none());

        let (status, _) = call(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({"shopid": "s1", "username": "cashier", "password": "nope-nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_master_sync_routes() {
        let app = app().await;
        call(
            &app,
            "POST",
            "/restaurant/zone",
            Some("s1"),
            Some(json!({"code": "Z1"})),
        )
        .await;

        let (status, body) = call(&app, "GET", "/master-sync", Some("s1"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "lastupdate format invalid.");

        let (status, body) = call(
            &app,
            "GET",
            "/master-sync?lastupdate=2000-01-01T00:00:00&module=restaurant-zone",
            Some("s1"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["restaurant-zone"]["new"][0]["code"], "Z1");
        assert_eq!(body["pagination"]["total"], 1);

        let (status, body) = call(
            &app,
            "GET",
            "/master-sync/list?lastupdate=2000-01-01T00:00:00&action=remove",
            Some("s1"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_object().map(|m| m.len()), Some(21));
        assert!(body["data"]["restaurant-zone"].get("new").is_none());

        let (status, body) = call(&app, "GET", "/master-sync/status", Some("s1"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["restaurant-zone"].as_i64().unwrap() > 0);
        assert_eq!(body["bankmaster"], 0);
    }

    async fn call_with_token(
        app: &Router,
        method: &str,
        uri: &str,
        token: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {token}"));
        let req = match body {
            Some(b) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_register_shop_and_manage_permissions() {
        let app = app().await;
        let (status, body) = call(
            &app,
            "POST",
            "/register",
            None,
            Some(json!({
                "shop": {"name1": "Coffee"},
                "username": "boss",
                "name": "Boss",
                "password": "secret123"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let shop_id = body["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["shopid"], shop_id.as_str());
        let token = body["data"]["token"].as_str().unwrap().to_string();

        let (status, body) =
            call_with_token(&app, "GET", &format!("/shop/{shop_id}"), &token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name1"], "Coffee");

        let (status, body) = call_with_token(&app, "GET", "/shop?q=coff", &token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["shopid"], shop_id.as_str());
        assert_eq!(body["data"][0]["role"], 2);
        assert_eq!(body["pagination"]["total"], 1);

        let (status, _) = call_with_token(
            &app,
            "PUT",
            "/shop/permission",
            &token,
            Some(json!({"username": "clerk", "role": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = call_with_token(&app, "GET", "/shop/users", &token, None).await;
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
        let (status, body) =
            call_with_token(&app, "GET", "/shop/permission/clerk", &token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["role"], 0);

        // another shop's token cannot read or change this shop
        let (status, _) = call(&app, "GET", &format!("/shop/{shop_id}"), Some("s2"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = call(
            &app,
            "PUT",
            &format!("/shop/{shop_id}"),
            Some(shop_id.as_str()),
            Some(json!({"name1": "Tea"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call_with_token(
            &app,
            "DELETE",
            "/shop/permission/clerk",
            &token,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) =
            call_with_token(&app, "GET", "/shop/permission/clerk", &token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({"shopid": shop_id, "username": "boss", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
