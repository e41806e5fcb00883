//! Shopify webhook handlers for order lifecycle events.
//!
//! Every handler follows the same contract: verify the delivery signature,
//! decode the payload, hand reconciliation off to a detached task, and
//! acknowledge immediately. Shopify retries (and eventually removes)
//! webhook subscriptions that respond slowly, so the acknowledgment must
//! not wait for the multi-call reconciliation to finish. Processing
//! failures after the acknowledgment are observable only via logs and
//! Sentry, by design.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::error::AppError;
use crate::shopify::types::{Order, Refund};
use crate::state::AppState;

/// Header carrying the delivery signature.
const HMAC_HEADER: &str = "X-Shopify-Hmac-Sha256";

/// Create webhook routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhooks/orders/create", post(orders_create))
        .route("/webhooks/orders/fulfilled", post(orders_fulfilled))
        .route("/webhooks/orders/cancelled", post(orders_cancelled))
        .route("/webhooks/orders/edited", post(orders_edited))
        .route("/webhooks/refunds/create", post(refunds_create))
}

/// Handle `orders/create`: commit bundle component stock.
#[instrument(skip(state, headers, body))]
async fn orders_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let order: Order = authenticate(&state, &headers, &body)?;
    tokio::spawn(async move {
        state.reconciler().order_created(&order).await;
    });
    Ok(StatusCode::OK)
}

/// Handle `orders/fulfilled`: no inventory action.
#[instrument(skip(state, headers, body))]
async fn orders_fulfilled(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let order: Order = authenticate(&state, &headers, &body)?;
    tokio::spawn(async move {
        state.reconciler().order_fulfilled(&order).await;
    });
    Ok(StatusCode::OK)
}

/// Handle `orders/cancelled`: release bundle component stock.
#[instrument(skip(state, headers, body))]
async fn orders_cancelled(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let order: Order = authenticate(&state, &headers, &body)?;
    tokio::spawn(async move {
        state.reconciler().order_cancelled(&order).await;
    });
    Ok(StatusCode::OK)
}

/// Handle `orders/edited`: no inventory action (removals arrive as refunds).
#[instrument(skip(state, headers, body))]
async fn orders_edited(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let order: Order = authenticate(&state, &headers, &body)?;
    tokio::spawn(async move {
        state.reconciler().order_edited(&order).await;
    });
    Ok(StatusCode::OK)
}

/// Handle `refunds/create`: restore stock per restock type.
#[instrument(skip(state, headers, body))]
async fn refunds_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let refund: Refund = authenticate(&state, &headers, &body)?;
    tokio::spawn(async move {
        state.reconciler().refund_created(&refund).await;
    });
    Ok(StatusCode::OK)
}

/// Verify the delivery signature and decode the payload.
///
/// These are the only failures the event source ever sees; everything
/// after the acknowledgment is best-effort.
fn authenticate<T: DeserializeOwned>(
    state: &AppState,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<T, AppError> {
    let signature = headers
        .get(HMAC_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing signature header".into()))?;

    verify_signature(&state.config().shopify.webhook_secret, body, signature)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;

    debug!("Webhook signature verified");

    serde_json::from_slice(body)
        .map_err(|e| AppError::BadRequest(format!("Failed to parse payload: {e}")))
}

/// Signature verification failures.
#[derive(Debug, Error)]
enum SignatureError {
    #[error("invalid signing key: {0}")]
    Key(String),
    #[error("signature mismatch")]
    Mismatch,
}

/// Verify a webhook delivery signature.
///
/// Shopify signs the raw request body with HMAC-SHA256 over the shared
/// webhook secret and sends the base64 digest in `X-Shopify-Hmac-Sha256`.
fn verify_signature(
    secret: &SecretString,
    body: &[u8],
    signature: &str,
) -> Result<(), SignatureError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|e| SignatureError::Key(e.to_string()))?;

    mac.update(body);

    let expected = BASE64.encode(mac.finalize().into_bytes());

    // Constant-time comparison
    if !constant_time_compare(&expected, signature) {
        return Err(SignatureError::Mismatch);
    }

    Ok(())
}

/// Compare two strings in constant time to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
