// ABOUTME: API error type rendered as the uniform {success: false, error} JSON envelope.
// ABOUTME: Maps store, GitHub, and model failures onto 400/401/500 status codes.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use vibe_agent::ModelError;
use vibe_core::ConfigStoreError;
use vibe_github::GithubError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] ConfigStoreError),

    #[error(transparent)]
    Github(#[from] GithubError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(ConfigStoreError::NotAnObject) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Github(GithubError::InvalidRepoUrl(_)) => StatusCode::BAD_REQUEST,
            ApiError::Github(e) if e.is_access_failure() => StatusCode::UNAUTHORIZED,
            ApiError::Github(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Model(ModelError::MissingCredentials(_)) => StatusCode::BAD_REQUEST,
            ApiError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(format!("Invalid query: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "request rejected: {}", self);
        }

        (
            status,
            Json(json!({ "success": false, "error": self.to_string() })),
        )
            .into_response()
    }
}
