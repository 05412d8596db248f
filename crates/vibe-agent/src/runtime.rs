// ABOUTME: Defines the ModelClient trait every hosted-model adapter implements.
// ABOUTME: Also defines InvokeRequest (what callers send) and ModelError (what can go wrong).

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::credentials::AwsSettings;

pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// One text-completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Overrides the client's configured model for this call only.
    pub model_id: Option<String>,
}

impl InvokeRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            model_id: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }
}

/// Errors that can occur while talking to a hosted model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("AWS credentials not found: {0}")]
    MissingCredentials(String),

    #[error("Bedrock API error: {message}")]
    Provider {
        code: Option<String>,
        message: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ModelError {
    /// Human-readable cause for a failed connection check.
    pub fn connection_failure(&self) -> String {
        match self {
            ModelError::MissingCredentials(_) => "AWS credentials not found".to_string(),
            ModelError::Provider { code, message } => match code.as_deref() {
                Some("UnrecognizedClientException")
                | Some("UnauthorizedOperation")
                | Some("InvalidSignatureException") => "Invalid AWS credentials".to_string(),
                Some("ValidationException") => "Invalid model ID or request format".to_string(),
                Some("AccessDeniedException") => {
                    "Access denied to the requested model".to_string()
                }
                _ => format!("AWS Error: {}", message),
            },
            ModelError::InvalidResponse(_) => self.to_string(),
        }
    }
}

/// Trait all hosted-model adapters implement.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Run one completion and return the generated text.
    async fn invoke(&self, request: &InvokeRequest) -> Result<String, ModelError>;

    /// Run one completion incrementally. Each text delta is sent on `deltas`
    /// as it arrives; the accumulated text is returned at the end. A closed
    /// receiver stops reading.
    async fn invoke_stream(
        &self,
        request: &InvokeRequest,
        deltas: UnboundedSender<String>,
    ) -> Result<String, ModelError>;

    /// Model identifier used when a request does not name one.
    fn model_id(&self) -> &str;
}

/// Builds model clients from resolved settings. Handlers receive one of
/// these through application state instead of constructing clients directly.
pub trait ModelClientFactory: Send + Sync {
    fn connect(&self, settings: &AwsSettings) -> Result<Arc<dyn ModelClient>, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoke_request_defaults() {
        let req = InvokeRequest::new("hi");
        assert_eq!(req.max_tokens, 4000);
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert!(req.system.is_none());
        assert!(req.model_id.is_none());
    }

    #[test]
    fn builder_overrides_apply() {
        let req = InvokeRequest::new("hi")
            .with_system("be brief")
            .with_max_tokens(50)
            .with_temperature(0.1)
            .with_model("m-1");
        assert_eq!(req.system.as_deref(), Some("be brief"));
        assert_eq!(req.max_tokens, 50);
        assert_eq!(req.model_id.as_deref(), Some("m-1"));
    }

    #[test]
    fn connection_failure_maps_provider_codes() {
        let err = |code: &str| ModelError::Provider {
            code: Some(code.to_string()),
            message: "boom".to_string(),
        };

        assert_eq!(
            err("UnrecognizedClientException").connection_failure(),
            "Invalid AWS credentials"
        );
        assert_eq!(
            err("ValidationException").connection_failure(),
            "Invalid model ID or request format"
        );
        assert_eq!(
            err("AccessDeniedException").connection_failure(),
            "Access denied to the requested model"
        );
        assert_eq!(err("ThrottlingException").connection_failure(), "AWS Error: boom");
        assert_eq!(
            ModelError::MissingCredentials("x".into()).connection_failure(),
            "AWS credentials not found"
        );
    }

    #[test]
    fn model_error_display() {
        let errors = vec![
            ModelError::MissingCredentials("access key id is empty".to_string()),
            ModelError::Provider {
                code: None,
                message: "connection reset".to_string(),
            },
            ModelError::InvalidResponse("no text block".to_string()),
        ];

        for err in &errors {
            assert!(!err.to_string().is_empty());
        }
        assert!(errors[1].to_string().contains("connection reset"));
    }
}
