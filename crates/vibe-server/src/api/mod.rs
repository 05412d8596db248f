// ABOUTME: HTTP handler modules for the vibe-assistant API, plus the shared success envelope.
// ABOUTME: Organized by surface: config, requirements, repositories, GitHub, Bedrock, prompts, analysis.

use axum::Json;
use serde::Serialize;

pub mod analysis;
pub mod bedrock;
pub mod config;
pub mod github;
pub mod prompt;
pub mod repositories;
pub mod requirements;

/// `{"success": true, ...body}`.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

pub fn success<T: Serialize>(body: T) -> Json<Success<T>> {
    Json(Success {
        success: true,
        body,
    })
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;
    use vibe_agent::ModelClientFactory;
    use vibe_agent::testing::StubModelFactory;

    use crate::app_state::AppState;
    use crate::config::ServerConfig;
    use crate::routes::create_router;

    pub fn test_config(dir: &tempfile::TempDir) -> ServerConfig {
        ServerConfig {
            config_path: dir.path().join("config").join("user_config.json"),
            ..ServerConfig::default()
        }
    }

    pub fn app_with(config: ServerConfig, models: Arc<dyn ModelClientFactory>) -> Router {
        create_router(Arc::new(AppState::with_models(config, models).unwrap()))
    }

    /// Router with a temp config file and no usable model.
    pub fn app(dir: &tempfile::TempDir) -> Router {
        app_with(test_config(dir), Arc::new(StubModelFactory::unavailable()))
    }

    pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(request).await.unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }
}
