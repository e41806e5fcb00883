//! Webhook ingress tests: signature verification and acknowledgment.
//!
//! The reconciliation itself is detached from the request cycle, so these
//! tests assert only the pre-acknowledgment surface: signature checks,
//! payload decoding, and the immediate 200.

#![allow(clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use sha2::Sha256;
use tower::ServiceExt;

use cottonlove_sync::config::{ShopifySyncConfig, SyncConfig};
use cottonlove_sync::routes;
use cottonlove_sync::state::AppState;

const WEBHOOK_SECRET: &str = "whsec_integration_test";

fn test_config() -> SyncConfig {
    SyncConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        shopify: ShopifySyncConfig {
            store: "test.myshopify.com".to_string(),
            api_version: "2026-01".to_string(),
            admin_token: SecretString::from("shpat_test_token"),
            webhook_secret: SecretString::from(WEBHOOK_SECRET),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 1.0,
    }
}

fn app() -> Router {
    let state = AppState::new(test_config()).unwrap();
    routes::routes().with_state(state)
}

fn sign(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    BASE64.encode(mac.finalize().into_bytes())
}

fn webhook_request(path: &str, body: &str, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("Content-Type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("X-Shopify-Hmac-Sha256", signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_valid_delivery_is_acknowledged() {
    let body = r##"{"id": 9001, "name": "#1042", "line_items": []}"##;
    let signature = sign(WEBHOOK_SECRET, body.as_bytes());

    let response = app()
        .oneshot(webhook_request(
            "/webhooks/orders/create",
            body,
            Some(&signature),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_signature_is_rejected() {
    let body = r##"{"id": 9001, "name": "#1042"}"##;

    let response = app()
        .oneshot(webhook_request("/webhooks/orders/create", body, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_signature_is_rejected() {
    let body = r##"{"id": 9001, "name": "#1042"}"##;
    let signature = sign("whsec_other_secret_0000", body.as_bytes());

    let response = app()
        .oneshot(webhook_request(
            "/webhooks/orders/create",
            body,
            Some(&signature),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tampered_body_is_rejected() {
    let signed_body = r##"{"id": 9001, "name": "#1042"}"##;
    let signature = sign(WEBHOOK_SECRET, signed_body.as_bytes());
    let tampered_body = r##"{"id": 9002, "name": "#1043"}"##;

    let response = app()
        .oneshot(webhook_request(
            "/webhooks/orders/create",
            tampered_body,
            Some(&signature),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_payload_is_a_bad_request() {
    let body = "{not json";
    let signature = sign(WEBHOOK_SECRET, body.as_bytes());

    let response = app()
        .oneshot(webhook_request(
            "/webhooks/orders/create",
            body,
            Some(&signature),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refund_route_acknowledges_valid_delivery() {
    let body = r#"{"id": 501, "order_id": 9001, "refund_line_items": []}"#;
    let signature = sign(WEBHOOK_SECRET, body.as_bytes());

    let response = app()
        .oneshot(webhook_request(
            "/webhooks/refunds/create",
            body,
            Some(&signature),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_all_order_routes_are_registered() {
    let body = r##"{"id": 9001, "name": "#1042", "line_items": []}"##;
    let signature = sign(WEBHOOK_SECRET, body.as_bytes());

    for path in [
        "/webhooks/orders/create",
        "/webhooks/orders/fulfilled",
        "/webhooks/orders/cancelled",
        "/webhooks/orders/edited",
    ] {
        let response = app()
            .oneshot(webhook_request(path, body, Some(&signature)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "route {path}");
    }
}
