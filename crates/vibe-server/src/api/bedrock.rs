// ABOUTME: Bedrock handlers: connection test, one-shot chat, and SSE-streamed chat.
// ABOUTME: Credentials come from the request, then stored config, then the environment.

use std::convert::Infallible;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio_stream::wrappers::UnboundedReceiverStream;
use vibe_agent::{AwsOverrides, ModelError, chat, chat_request, test_connection};
use vibe_core::FileSelection;

use crate::api::github::not_connected;
use crate::api::success;
use crate::app_state::SharedState;
use crate::error::ApiError;

/// AWS fields a caller may supply to override stored settings.
#[derive(Debug, Default, Deserialize)]
pub struct AwsRequestConfig {
    #[serde(default)]
    pub aws_access_key_id: Option<String>,
    #[serde(default)]
    pub aws_secret_access_key: Option<String>,
    #[serde(default)]
    pub aws_region: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
}

impl From<AwsRequestConfig> for AwsOverrides {
    fn from(req: AwsRequestConfig) -> Self {
        AwsOverrides {
            access_key_id: req.aws_access_key_id,
            secret_access_key: req.aws_secret_access_key,
            region: req.aws_region,
            model_id: req.model_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub current_prompt: String,
    #[serde(default)]
    pub selected_files: Vec<FileSelection>,
    #[serde(default)]
    pub config: AwsRequestConfig,
}

/// POST /api/bedrock/test
pub async fn test_bedrock(
    State(state): State<SharedState>,
    payload: Result<Json<AwsRequestConfig>, JsonRejection>,
) -> Response {
    let overrides = match payload {
        Ok(Json(req)) => AwsOverrides::from(req),
        Err(rejection) => return not_connected(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let settings = match state.aws_settings(&overrides) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("bedrock connection test could not read config: {}", e);
            return not_connected(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let client = match state.models.connect(&settings) {
        Ok(client) => client,
        Err(ModelError::MissingCredentials(_)) => {
            return not_connected(
                StatusCode::BAD_REQUEST,
                "Missing required AWS credentials or model ID",
            );
        }
        Err(e) => return not_connected(StatusCode::UNAUTHORIZED, e.connection_failure()),
    };

    match test_connection(client.as_ref()).await {
        Ok(()) => Json(json!({
            "connected": true,
            "message": "Successfully connected to AWS Bedrock",
        }))
        .into_response(),
        Err(e @ ModelError::InvalidResponse(_)) => {
            tracing::error!("bedrock connection test failed: {}", e);
            not_connected(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => not_connected(StatusCode::UNAUTHORIZED, e.connection_failure()),
    }
}

fn validate_chat(req: &ChatRequest) -> Result<(), ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::Validation("Message is required".to_string()));
    }
    Ok(())
}

/// POST /api/bedrock/chat
pub async fn chat_with_model(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    validate_chat(&req)?;

    let settings = state.aws_settings(&req.config.into())?;
    let client = state.models.connect(&settings)?;

    let response = chat(
        client.as_ref(),
        &req.message,
        &req.current_prompt,
        &req.selected_files,
    )
    .await?;
    Ok(success(json!({ "response": response })))
}

/// POST /api/bedrock/chat/stream - Chat over Server-Sent Events.
///
/// Emits `delta` events with `{"text": ...}` as the model produces output,
/// then one `done` event with `{"response": full_text}` or an `error` event.
pub async fn chat_stream(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    let Json(req) = payload?;
    validate_chat(&req)?;

    let settings = state.aws_settings(&req.config.into())?;
    let client = state.models.connect(&settings)?;
    let request = chat_request(&req.message, &req.current_prompt, &req.selected_files);

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let task = tokio::spawn(async move { client.invoke_stream(&request, tx).await });

    let deltas = UnboundedReceiverStream::new(rx)
        .map(|text| {
            Ok::<_, Infallible>(
                SseEvent::default()
                    .event("delta")
                    .data(json!({ "text": text }).to_string()),
            )
        });

    let finish = stream::once(async move {
        let event = match task.await {
            Ok(Ok(full)) => SseEvent::default()
                .event("done")
                .data(json!({ "response": full }).to_string()),
            Ok(Err(e)) => {
                tracing::error!("streamed chat failed: {}", e);
                SseEvent::default()
                    .event("error")
                    .data(json!({ "error": e.to_string() }).to_string())
            }
            Err(e) => {
                tracing::error!("streamed chat task panicked: {}", e);
                SseEvent::default()
                    .event("error")
                    .data(json!({ "error": "stream task failed" }).to_string())
            }
        };
        Ok::<_, Infallible>(event)
    });

    Ok(Sse::new(deltas.chain(finish)).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;
    use vibe_agent::testing::{StubModelClient, StubModelFactory};

    use crate::api::test_helpers::{app, app_with, post, test_config};

    fn app_responding(dir: &tempfile::TempDir, client: StubModelClient) -> axum::Router {
        app_with(
            test_config(dir),
            Arc::new(StubModelFactory::with_client(client)),
        )
    }

    #[tokio::test]
    async fn test_reports_missing_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) = post(app(&dir), "/api/bedrock/test", json!({})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["connected"], false);
        assert_eq!(json["error"], "Missing required AWS credentials or model ID");
    }

    #[tokio::test]
    async fn test_connects_with_working_client() {
        let dir = tempfile::tempdir().unwrap();
        let client = StubModelClient::new("Hi");
        let (status, json) = post(
            app_responding(&dir, client),
            "/api/bedrock/test",
            json!({ "aws_access_key_id": "AKID", "aws_secret_access_key": "s" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["connected"], true);
        assert_eq!(json["message"], "Successfully connected to AWS Bedrock");
    }

    #[tokio::test]
    async fn test_maps_provider_error_codes() {
        let dir = tempfile::tempdir().unwrap();
        let client = StubModelClient::sequence(vec![Err(vibe_agent::ModelError::Provider {
            code: Some("ValidationException".into()),
            message: "bad model".into(),
        })]);
        let (status, json) = post(
            app_responding(&dir, client),
            "/api/bedrock/test",
            json!({ "model_id": "nope" }),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Invalid model ID or request format");
    }

    #[tokio::test]
    async fn chat_returns_model_text() {
        let dir = tempfile::tempdir().unwrap();
        let factory = StubModelFactory::with_client(StubModelClient::new("Try adding examples."));
        let app = app_with(test_config(&dir), Arc::new(factory.clone()));

        let (status, json) = post(
            app,
            "/api/bedrock/chat",
            json!({
                "message": "How can I improve this?",
                "current_prompt": "Write a parser",
                "selected_files": [{ "path": "src/parse.rs", "type": "file" }]
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["response"], "Try adding examples.");

        let sent = factory.client().unwrap().requests();
        assert_eq!(sent[0].max_tokens, 1000);
        assert!(sent[0].system.as_deref().unwrap().contains("- src/parse.rs (file)"));
    }

    #[tokio::test]
    async fn chat_without_credentials_is_a_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let (status, json) =
            post(app(&dir), "/api/bedrock/chat", json!({ "message": "hi" })).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().starts_with("AWS credentials not found"));
    }

    #[tokio::test]
    async fn chat_requires_message() {
        let dir = tempfile::tempdir().unwrap();
        let client = StubModelClient::new("unused");
        let (status, json) =
            post(app_responding(&dir, client), "/api/bedrock/chat", json!({})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Message is required");
    }

    #[tokio::test]
    async fn chat_stream_emits_deltas_then_done() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_responding(&dir, StubModelClient::new("hello streaming world"));

        let request = Request::post("/api/bedrock/chat/stream")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "message": "hi" }).to_string()))
            .unwrap();
        let resp = app.oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/event-stream"
        );

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();

        assert_eq!(text.matches("event: delta").count(), 3);
        assert!(text.contains(r#"data: {"text":"hello "}"#));
        let done = text.find("event: done").unwrap();
        assert!(done > text.rfind("event: delta").unwrap());
        assert!(text.contains(r#"data: {"response":"hello streaming world"}"#));
    }

    #[tokio::test]
    async fn chat_stream_reports_model_failure_as_event() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_responding(&dir, StubModelClient::failing("throttled"));

        let request = Request::post("/api/bedrock/chat/stream")
            .header("content-type", "application/json")
            .body(Body::from(json!({ "message": "hi" }).to_string()))
            .unwrap();
        let resp = app.oneshot(request).await.unwrap();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();

        assert!(text.contains("event: error"));
        assert!(text.contains("Bedrock API error: throttled"));
        assert!(!text.contains("event: done"));
    }
}
