//! Router tests that need no database.
//!
//! The state holds a disconnected pool, so only requests rejected before any
//! query runs are exercised here. Full write paths are covered by the
//! repository tests in `stockledger-db`.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use stockledger_api::{AppState, create_router};
use stockledger_core::ledger::AccountCache;
use stockledger_db::DbHandle;
use stockledger_shared::PostingConfig;
use tower::ServiceExt;
use uuid::Uuid;

fn app() -> axum::Router {
    let db = DbHandle::new(DatabaseConnection::Disconnected, 1_000);
    let state = AppState::new(db, PostingConfig::default(), AccountCache::with_config(16, 60));
    create_router(state)
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_reports_database_down() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "down");
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let response = app()
        .oneshot(post_json("/api/v1/stock-movements", "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_movement_without_item_is_rejected() {
    let payload = json!({
        "entityId": Uuid::now_v7(),
        "warehouseId": Uuid::now_v7(),
        "type": "in",
        "quantity": 10,
        "unitCost": "5",
        "date": "2026-03-15"
    });

    let response = app()
        .oneshot(post_json("/api/v1/stock-movements", payload.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().unwrap().contains("itemId"));
}

#[tokio::test]
async fn test_voucher_with_both_funding_accounts_is_rejected() {
    let payload = json!({
        "entityId": Uuid::now_v7(),
        "type": "out",
        "cashBoxId": Uuid::now_v7(),
        "bankWalletId": Uuid::now_v7(),
        "date": "2026-03-15",
        "currency": "USD",
        "totalAmount": "100",
        "operations": [
            { "chartAccountId": Uuid::now_v7(), "amount": "100" }
        ]
    });

    let response = app()
        .oneshot(post_json("/api/v1/payment-vouchers", payload.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/nothing-here")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
