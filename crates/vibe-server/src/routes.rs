// ABOUTME: Route definitions for the vibe-assistant HTTP API.
// ABOUTME: Assembles all API routes, the JSON 404 fallback, CORS, and request tracing into one Router.

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::SharedState;

/// Build the complete Axum router with all routes and shared state.
pub fn create_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_router = Router::new()
        .route("/health", get(health))
        .route(
            "/config",
            get(api::config::get_config).post(api::config::update_config),
        )
        .route(
            "/user/config",
            get(api::config::get_config).post(api::config::update_user_config),
        )
        .route(
            "/requirements",
            get(api::requirements::list_requirements)
                .post(api::requirements::update_requirements),
        )
        .route("/repositories/files", post(api::repositories::list_files))
        .route(
            "/repositories/file-content",
            post(api::repositories::file_content),
        )
        .route("/repository/analyze", get(api::analysis::analyze))
        .route("/github/test", post(api::github::test_connection))
        .route("/bedrock/test", post(api::bedrock::test_bedrock))
        .route("/bedrock/chat", post(api::bedrock::chat_with_model))
        .route("/bedrock/chat/stream", post(api::bedrock::chat_stream))
        .route("/prompt/build", post(api::prompt::build_prompt))
        .route("/prompt/enhance", post(api::prompt::enhance_prompt))
        .route("/prompt/analyze-task", post(api::prompt::analyze_task));

    Router::new()
        .nest("/api", api_router)
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "service": "vibe-assistant" }))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Endpoint not found" })),
    )
}

#[cfg(test)]
mod tests {
    use crate::api::test_helpers::{app, get, post};
    use axum::body::Body;
    use http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_returns_service_name() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = get(app(&dir), "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "vibe-assistant");
    }

    #[tokio::test]
    async fn unknown_routes_get_json_404() {
        let dir = tempfile::tempdir().unwrap();
        for uri in ["/nope", "/api/nope"] {
            let (status, json) = get(app(&dir), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(json, json!({ "success": false, "error": "Endpoint not found" }));
        }
    }

    #[tokio::test]
    async fn malformed_body_uses_error_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::post("/api/prompt/build")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let resp = app(&dir).oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::get("/api/health")
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let resp = app(&dir).oneshot(request).await.unwrap();

        assert_eq!(
            resp.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn requirements_route_accepts_post() {
        let dir = tempfile::tempdir().unwrap();
        let (status, _) = post(
            app(&dir),
            "/api/requirements",
            json!({ "task_type": "testing", "requirements": ["a"] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
