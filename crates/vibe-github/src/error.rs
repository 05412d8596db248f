// ABOUTME: Error type for the GitHub adapter.
// ABOUTME: Status-code signatures are classified into not-found, auth, and rate-limit categories.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("Invalid repository URL: {0}")]
    InvalidRepoUrl(String),

    #[error("Invalid GitHub API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Repository not found or access denied")]
    NotFound,

    #[error("Invalid GitHub token or insufficient permissions")]
    Unauthorized,

    #[error("Rate limit exceeded or access forbidden")]
    RateLimited,

    #[error("GitHub API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response from GitHub: {0}")]
    InvalidResponse(String),
}

impl GithubError {
    /// Classify a non-success status. `body` is GitHub's error document, if any.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            404 => GithubError::NotFound,
            401 => GithubError::Unauthorized,
            403 | 429 => GithubError::RateLimited,
            code => {
                let message = serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                    .unwrap_or_else(|| body.to_string());
                GithubError::Api {
                    status: code,
                    message,
                }
            }
        }
    }

    /// True for the not-found, auth, and rate-limit categories.
    pub fn is_access_failure(&self) -> bool {
        matches!(
            self,
            GithubError::NotFound | GithubError::Unauthorized | GithubError::RateLimited
        )
    }
}
