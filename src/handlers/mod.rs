pub mod health;
pub mod webhook;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/actions", get(webhook::list_actions))
        .route("/webhook", post(webhook::action_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
