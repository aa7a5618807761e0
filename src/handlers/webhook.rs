use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{ActionRequest, ActionResponse};
use crate::services::actions;
use crate::state::AppState;

/// Custom-action endpoint called by the dialogue engine once per action.
pub async fn action_webhook(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, AppError> {
    let Json(request) = payload.map_err(|e| {
        tracing::warn!(error = %e, "malformed action request");
        AppError::BadRequest(e.body_text())
    })?;

    let response = actions::run_action(&state, &request).await.map_err(|e| {
        tracing::warn!(error = %e, action = %request.next_action, "action rejected");
        e
    })?;

    tracing::debug!(
        action = %request.next_action,
        events = response.events.len(),
        responses = response.responses.len(),
        "action completed"
    );
    Ok(Json(response))
}

#[derive(Serialize)]
pub struct ActionInfo {
    pub name: &'static str,
}

pub async fn list_actions() -> Json<Vec<ActionInfo>> {
    Json(
        actions::ACTION_NAMES
            .iter()
            .map(|name| ActionInfo { name: *name })
            .collect(),
    )
}
