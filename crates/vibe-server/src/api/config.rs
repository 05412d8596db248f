// ABOUTME: Handlers for reading and replacing the stored user configuration document.
// ABOUTME: Serves both /api/config and /api/user/config; writes replace the document wholesale.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use serde_json::{Value, json};

use crate::api::success;
use crate::app_state::SharedState;
use crate::error::ApiError;

/// GET /api/config and GET /api/user/config
pub async fn get_config(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let config = state.store.read_document()?;
    Ok(success(json!({ "config": config })))
}

/// POST /api/config - Replace the document and echo it back.
pub async fn update_config(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(document) = payload?;
    let config = state.store.write_document(document)?;
    tracing::info!(path = %state.store.path().display(), "configuration replaced");
    Ok(success(json!({ "config": config })))
}

/// POST /api/user/config - Replace the document.
pub async fn update_user_config(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(document) = payload?;
    state.store.write_document(document)?;
    tracing::info!(path = %state.store.path().display(), "user configuration replaced");
    Ok(success(json!({ "message": "Configuration updated successfully" })))
}
