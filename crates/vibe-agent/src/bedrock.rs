// ABOUTME: AWS Bedrock adapter implementing ModelClient over the Anthropic messages body format.
// ABOUTME: Supports one-shot InvokeModel and chunked InvokeModelWithResponseStream.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_bedrockruntime::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::types::ResponseStream;
use serde_json::{Value, json};
use tokio::sync::mpsc::UnboundedSender;

use crate::credentials::AwsSettings;
use crate::runtime::{InvokeRequest, ModelClient, ModelClientFactory, ModelError};

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
const CREDENTIALS_PROVIDER: &str = "vibe-assistant";

/// Bedrock runtime client bound to one region and a default model.
pub struct BedrockClient {
    client: Client,
    model_id: String,
    region: String,
}

impl BedrockClient {
    /// Build a client from resolved settings. Fails without touching the
    /// network when the access key, secret, or region is empty.
    pub fn new(settings: &AwsSettings) -> Result<Self, ModelError> {
        if settings.access_key_id.is_empty() || settings.secret_access_key.is_empty() {
            return Err(ModelError::MissingCredentials(
                "access key id and secret access key are required".to_string(),
            ));
        }
        if settings.region.is_empty() {
            return Err(ModelError::MissingCredentials(
                "region is required".to_string(),
            ));
        }

        let credentials = Credentials::new(
            &settings.access_key_id,
            &settings.secret_access_key,
            None,
            None,
            CREDENTIALS_PROVIDER,
        );
        let config = aws_sdk_bedrockruntime::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .build();

        tracing::info!(
            region = %settings.region,
            model = %settings.model_id,
            "bedrock client initialized"
        );

        Ok(Self {
            client: Client::from_conf(config),
            model_id: settings.model_id.clone(),
            region: settings.region.clone(),
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    fn resolve_model<'a>(&'a self, request: &'a InvokeRequest) -> &'a str {
        request.model_id.as_deref().unwrap_or(&self.model_id)
    }
}

/// Build the Anthropic-on-Bedrock JSON body for a request.
pub fn build_request_body(request: &InvokeRequest) -> Value {
    let mut body = json!({
        "anthropic_version": ANTHROPIC_VERSION,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
        "messages": [
            { "role": "user", "content": request.prompt }
        ]
    });
    if let Some(system) = &request.system {
        body["system"] = Value::String(system.clone());
    }
    body
}

/// Extract the first text block from a messages response.
pub fn parse_response(response_body: &Value) -> Result<String, ModelError> {
    response_body
        .get("content")
        .and_then(|c| c.as_array())
        .and_then(|blocks| blocks.first())
        .and_then(|block| block.get("text"))
        .and_then(|t| t.as_str())
        .map(String::from)
        .ok_or_else(|| {
            ModelError::InvalidResponse("unexpected response format from Claude".to_string())
        })
}

/// Extract the text delta from one streamed chunk, if it carries one.
pub fn parse_stream_chunk(bytes: &[u8]) -> Option<String> {
    let chunk: Value = serde_json::from_slice(bytes).ok()?;
    chunk
        .get("delta")
        .and_then(|d| d.get("text"))
        .and_then(|t| t.as_str())
        .map(String::from)
}

fn provider_error<E, R>(err: SdkError<E, R>) -> ModelError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err.code().map(String::from);
    let message = err
        .message()
        .map(String::from)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    tracing::error!(code = ?code, "bedrock call failed: {}", message);
    ModelError::Provider { code, message }
}

fn encode_body(request: &InvokeRequest) -> Result<Blob, ModelError> {
    serde_json::to_vec(&build_request_body(request))
        .map(Blob::new)
        .map_err(|e| ModelError::InvalidResponse(format!("failed to encode request: {}", e)))
}

#[async_trait]
impl ModelClient for BedrockClient {
    async fn invoke(&self, request: &InvokeRequest) -> Result<String, ModelError> {
        let output = self
            .client
            .invoke_model()
            .model_id(self.resolve_model(request))
            .content_type("application/json")
            .accept("application/json")
            .body(encode_body(request)?)
            .send()
            .await
            .map_err(provider_error)?;

        let response_body: Value = serde_json::from_slice(output.body().as_ref())
            .map_err(|e| ModelError::InvalidResponse(format!("failed to parse JSON: {}", e)))?;

        parse_response(&response_body)
    }

    async fn invoke_stream(
        &self,
        request: &InvokeRequest,
        deltas: UnboundedSender<String>,
    ) -> Result<String, ModelError> {
        let mut output = self
            .client
            .invoke_model_with_response_stream()
            .model_id(self.resolve_model(request))
            .content_type("application/json")
            .body(encode_body(request)?)
            .send()
            .await
            .map_err(provider_error)?;

        let mut full_response = String::new();
        while let Some(event) = output.body.recv().await.map_err(provider_error)? {
            if let ResponseStream::Chunk(part) = event
                && let Some(bytes) = part.bytes()
                && let Some(text) = parse_stream_chunk(bytes.as_ref())
            {
                full_response.push_str(&text);
                if deltas.send(text).is_err() {
                    tracing::debug!("stream receiver dropped; stopping early");
                    break;
                }
            }
        }

        Ok(full_response)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Factory producing [`BedrockClient`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct BedrockFactory;

impl ModelClientFactory for BedrockFactory {
    fn connect(&self, settings: &AwsSettings) -> Result<Arc<dyn ModelClient>, ModelError> {
        Ok(Arc::new(BedrockClient::new(settings)?))
    }
}
