//! HTTP route definitions.

use axum::Router;

use crate::state::AppState;

pub mod webhooks;

/// Build all application routes.
pub fn routes() -> Router<AppState> {
    Router::new().merge(webhooks::router())
}
