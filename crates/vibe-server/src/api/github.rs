// ABOUTME: GitHub connection test handler.
// ABOUTME: Answers with {connected, message, repository} or {connected: false, error}.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use vibe_github::GithubError;

use crate::app_state::SharedState;

#[derive(Debug, Default, Deserialize)]
pub struct GithubTestRequest {
    #[serde(default)]
    pub github_token: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub test_repo: Option<String>,
}

pub(crate) fn not_connected(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "connected": false, "error": error.into() })),
    )
        .into_response()
}

/// POST /api/github/test
pub async fn test_connection(
    State(state): State<SharedState>,
    payload: Result<Json<GithubTestRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return not_connected(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let test_repo = match req.test_repo.filter(|r| !r.is_empty()) {
        Some(repo) => Some(repo),
        None => match state.store.load() {
            Ok(config) => Some(config.github.default_repo).filter(|r| !r.is_empty()),
            Err(e) => {
                tracing::error!("github connection test could not read config: {}", e);
                return not_connected(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
            }
        },
    };
    let Some(test_repo) = test_repo else {
        return not_connected(StatusCode::BAD_REQUEST, "No repository specified for testing");
    };

    let requested = req
        .github_token
        .filter(|t| !t.is_empty())
        .or(req.token);
    let token = state.github_token(requested.as_deref());

    match state.github.test_connection(&test_repo, token.as_deref()).await {
        Ok(info) => Json(json!({
            "connected": true,
            "message": format!("Successfully connected to {}", info.full_name),
            "repository": info,
        }))
        .into_response(),
        Err(e @ GithubError::InvalidRepoUrl(_)) => {
            not_connected(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) if e.is_access_failure() => not_connected(StatusCode::UNAUTHORIZED, e.to_string()),
        Err(e) => {
            tracing::error!("github connection test failed: {}", e);
            not_connected(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::api::test_helpers::{app, app_with, post, test_config};
    use http::StatusCode;
    use serde_json::json;
    use vibe_agent::testing::StubModelFactory;

    #[tokio::test]
    async fn requires_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = post(app(&dir), "/api/github/test", json!({ "token": "t" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["connected"], false);
        assert_eq!(json["error"], "No repository specified for testing");
    }

    #[tokio::test]
    async fn null_default_repo_counts_as_unset() {
        let dir = tempfile::tempdir().unwrap();
        post(
            app(&dir),
            "/api/user/config",
            json!({ "aws": null, "github": { "token": null, "default_repo": null } }),
        )
        .await;

        let (status, json) = post(app(&dir), "/api/github/test", json!({})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No repository specified for testing");
    }

    #[tokio::test]
    async fn connects_using_stored_default_repo() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/octo/widgets")
            .match_header("authorization", "Bearer alt-token")
            .with_status(200)
            .with_body(r#"{"name":"widgets","full_name":"octo/widgets","private":false,"default_branch":"main"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&dir);
        config.github_api_url = server.url();
        let app = app_with(config, Arc::new(StubModelFactory::unavailable()));

        post(
            app.clone(),
            "/api/user/config",
            json!({ "github": { "default_repo": "octo/widgets" } }),
        )
        .await;

        let (status, json) = post(app, "/api/github/test", json!({ "token": "alt-token" })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["connected"], true);
        assert_eq!(json["message"], "Successfully connected to octo/widgets");
        assert_eq!(json["repository"]["default_branch"], "main");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn bad_credentials_report_human_readable_cause() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/octo/widgets")
            .with_status(401)
            .with_body(r#"{"message":"Bad credentials"}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(&dir);
        config.github_api_url = server.url();
        let app = app_with(config, Arc::new(StubModelFactory::unavailable()));

        let (status, json) = post(
            app,
            "/api/github/test",
            json!({ "github_token": "bad", "test_repo": "octo/widgets" }),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["connected"], false);
        assert_eq!(json["error"], "Invalid GitHub token or insufficient permissions");
    }
}
