// ABOUTME: Test utilities for vibe-agent, including a stub model client and factory.
// ABOUTME: Used in tests to simulate model responses without real Bedrock calls.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::credentials::AwsSettings;
use crate::runtime::{InvokeRequest, ModelClient, ModelClientFactory, ModelError};

/// A stub model client that replays canned responses.
///
/// Responses are consumed in order; once only one remains it is repeated
/// for every further call. Every request is recorded for inspection.
#[derive(Debug)]
pub struct StubModelClient {
    responses: Mutex<VecDeque<Result<String, ModelError>>>,
    requests: Mutex<Vec<InvokeRequest>>,
}

impl StubModelClient {
    /// Create a stub that always returns `text`.
    pub fn new(text: &str) -> Self {
        Self::sequence(vec![Ok(text.to_owned())])
    }

    /// Create a stub that always fails with a provider error.
    pub fn failing(message: &str) -> Self {
        Self::sequence(vec![Err(ModelError::Provider {
            code: None,
            message: message.to_owned(),
        })])
    }

    /// Create a stub that returns each response in turn.
    pub fn sequence(responses: Vec<Result<String, ModelError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<InvokeRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_response(&self, request: &InvokeRequest) -> Result<String, ModelError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let mut responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        if responses.len() > 1 {
            responses.pop_front().unwrap_or_else(|| Ok(String::new()))
        } else {
            responses.front().cloned().unwrap_or_else(|| Ok(String::new()))
        }
    }
}

#[async_trait]
impl ModelClient for StubModelClient {
    async fn invoke(&self, request: &InvokeRequest) -> Result<String, ModelError> {
        self.next_response(request)
    }

    async fn invoke_stream(
        &self,
        request: &InvokeRequest,
        deltas: UnboundedSender<String>,
    ) -> Result<String, ModelError> {
        let text = self.next_response(request)?;
        for piece in text.split_inclusive(' ') {
            if deltas.send(piece.to_owned()).is_err() {
                break;
            }
        }
        Ok(text)
    }

    fn model_id(&self) -> &str {
        "stub-model"
    }
}

/// Factory handing out a shared stub client, or refusing like a client
/// with missing credentials.
#[derive(Debug, Clone, Default)]
pub struct StubModelFactory {
    client: Option<Arc<StubModelClient>>,
}

impl StubModelFactory {
    pub fn with_client(client: StubModelClient) -> Self {
        Self {
            client: Some(Arc::new(client)),
        }
    }

    /// A factory that always fails as if no AWS credentials were configured.
    pub fn unavailable() -> Self {
        Self { client: None }
    }

    /// The shared stub, for inspecting recorded requests.
    pub fn client(&self) -> Option<Arc<StubModelClient>> {
        self.client.clone()
    }
}

impl ModelClientFactory for StubModelFactory {
    fn connect(&self, _settings: &AwsSettings) -> Result<Arc<dyn ModelClient>, ModelError> {
        match &self.client {
            Some(client) => Ok(Arc::clone(client) as Arc<dyn ModelClient>),
            None => Err(ModelError::MissingCredentials(
                "stub factory has no client".to_string(),
            )),
        }
    }
}
