// ABOUTME: Local repository analysis handler: file counts, sizes, extensions, and languages.
// ABOUTME: The walk runs on the blocking pool since it touches the filesystem.

use std::path::PathBuf;

use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use vibe_core::analyze_repository;

use crate::api::success;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AnalyzeQuery {
    #[serde(default)]
    pub repo_path: String,
}

/// GET /api/repository/analyze?repo_path=...
pub async fn analyze(
    query: Result<Query<AnalyzeQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query?;
    let root = PathBuf::from(&query.repo_path);
    if query.repo_path.is_empty() || !root.exists() {
        return Err(ApiError::Validation("Invalid repository path".to_string()));
    }

    let analysis = tokio::task::spawn_blocking(move || analyze_repository(&root))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(success(json!({ "analysis": analysis })))
}

#[cfg(test)]
mod tests {
    use crate::api::test_helpers::{app, get};
    use http::StatusCode;

    #[tokio::test]
    async fn rejects_missing_path() {
        let dir = tempfile::tempdir().unwrap();

        let (status, json) = get(app(&dir), "/api/repository/analyze").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Invalid repository path");

        let (status, _) = get(
            app(&dir),
            "/api/repository/analyze?repo_path=/no/such/place/anywhere",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analyzes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("repo");
        std::fs::create_dir_all(repo.join("src")).unwrap();
        std::fs::write(repo.join("src/main.py"), "print(1)").unwrap();
        std::fs::write(repo.join("README"), "hi").unwrap();

        let uri = format!("/api/repository/analyze?repo_path={}", repo.to_string_lossy());
        let (status, json) = get(app(&dir), &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["analysis"]["total_files"], 2);
        assert_eq!(json["analysis"]["total_size"], 10);
        assert_eq!(json["analysis"]["file_types"][".py"], 1);
        assert_eq!(json["analysis"]["languages"]["Python"], 1);
    }
}
