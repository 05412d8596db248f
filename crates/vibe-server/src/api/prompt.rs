// ABOUTME: Prompt builder handlers: context-enriched build, AI enhancement with fallback, task classification.
// ABOUTME: Enhancement always answers success; model failures switch to the deterministic fallback.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use vibe_agent::{AwsOverrides, analyze_task_type, enhance};
use vibe_core::{EnhanceRequest, PromptBuildRequest, TaskType};

use crate::api::success;
use crate::app_state::SharedState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AnalyzeTaskRequest {
    #[serde(default)]
    pub prompt: String,
}

/// POST /api/prompt/build
pub async fn build_prompt(
    State(state): State<SharedState>,
    payload: Result<Json<PromptBuildRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let worker = state.clone();
    let composed = tokio::task::spawn_blocking(move || worker.composer.build(&req, &worker.store))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    tracing::debug!(
        files = composed.files_processed,
        requirements = composed.requirements_applied,
        "prompt built"
    );
    Ok(success(composed))
}

/// POST /api/prompt/enhance
pub async fn enhance_prompt(
    State(state): State<SharedState>,
    payload: Result<Json<EnhanceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let requirements = state.store.requirements_for(&req.task_type)?;
    let settings = state.aws_settings(&AwsOverrides::default())?;

    let enhanced = enhance(state.models.as_ref(), &settings, &req, &requirements).await;
    tracing::info!(
        task_type = %enhanced.task_type,
        ai_enhanced = enhanced.ai_enhanced,
        requirements = enhanced.requirements_applied,
        "prompt enhanced"
    );
    Ok(success(enhanced))
}

/// POST /api/prompt/analyze-task
pub async fn analyze_task(
    State(state): State<SharedState>,
    payload: Result<Json<AnalyzeTaskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    if req.prompt.trim().is_empty() {
        return Err(ApiError::Validation("Prompt is required".to_string()));
    }

    let settings = state.aws_settings(&AwsOverrides::default())?;
    let task_type = match state.models.connect(&settings) {
        Ok(client) => analyze_task_type(client.as_ref(), &req.prompt).await,
        Err(e) => {
            tracing::warn!("task analysis unavailable, defaulting: {}", e);
            TaskType::Development
        }
    };

    Ok(success(json!({ "task_type": task_type.as_str() })))
}
