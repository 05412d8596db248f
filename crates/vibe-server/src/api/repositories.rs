// ABOUTME: Handlers that read repository trees and file content through the GitHub adapter.
// ABOUTME: Token precedence: request body, then stored config, then GITHUB_TOKEN.

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
pub struct FilesRequest {
    #[serde(default)]
    pub repo_url: String,
    #[serde(default)]
    pub github_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FileContentRequest {
    #[serde(default)]
    pub repo_url: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub github_token: Option<String>,
}

/// POST /api/repositories/files
pub async fn list_files(
    State(state): State<SharedState>,
    payload: Result<Json<FilesRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    if req.repo_url.trim().is_empty() {
        return Err(ApiError::Validation("Repository URL is required".to_string()));
    }

    let token = state.github_token(req.github_token.as_deref());
    let files = state.github.list_files(&req.repo_url, token.as_deref()).await?;
    Ok(success(json!({ "files": files })))
}

/// POST /api/repositories/file-content
pub async fn file_content(
    State(state): State<SharedState>,
    payload: Result<Json<FileContentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    if req.repo_url.trim().is_empty() || req.file_path.trim().is_empty() {
        return Err(ApiError::Validation(
            "Repository URL and file path are required".to_string(),
        ));
    }

    let token = state.github_token(req.github_token.as_deref());
    let content = state
        .github
        .get_file_content(&req.repo_url, &req.file_path, token.as_deref())
        .await?;
    Ok(success(json!({ "content": content })))
}
