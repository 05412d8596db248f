// ABOUTME: Handlers for listing and replacing per-task-type non-functional requirements.
// ABOUTME: The stored document is edited in place so unrelated sections survive an update.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;

use crate::api::success;
use crate::app_state::SharedState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct UpdateRequirementsRequest {
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub requirements: Option<Vec<String>>,
}

/// GET /api/requirements
pub async fn list_requirements(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state.store.read_document()?;
    let requirements = document
        .get("non_functional_requirements")
        .cloned()
        .unwrap_or_else(|| json!({}));
    Ok(success(json!({ "requirements": requirements })))
}

/// POST /api/requirements - Replace one task type's list.
pub async fn update_requirements(
    State(state): State<SharedState>,
    payload: Result<Json<UpdateRequirementsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let (Some(task_type), Some(requirements)) =
        (req.task_type.filter(|t| !t.is_empty()), req.requirements)
    else {
        return Err(ApiError::Validation(
            "Task type and requirements are required".to_string(),
        ));
    };

    let updated = state.store.update_requirements(&task_type, requirements)?;
    tracing::info!(task_type = %task_type, "requirements updated");
    Ok(success(json!({ "requirements": updated })))
}
