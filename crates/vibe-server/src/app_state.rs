// ABOUTME: Shared application state for the vibe-assistant HTTP server.
// ABOUTME: Holds the config store, GitHub client, model client factory, and prompt composer.

use std::sync::Arc;

use vibe_agent::{AwsOverrides, AwsSettings, BedrockFactory, ModelClientFactory, resolve_aws_settings};
use vibe_core::{ConfigStore, ConfigStoreError, PromptComposer};
use vibe_github::{GithubClient, GithubError};

use crate::config::ServerConfig;

/// Shared application state accessible by all Axum handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub store: ConfigStore,
    pub github: GithubClient,
    pub models: Arc<dyn ModelClientFactory>,
    pub composer: PromptComposer,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Production state backed by AWS Bedrock.
    pub fn new(config: ServerConfig) -> Result<Self, GithubError> {
        Self::with_models(config, Arc::new(BedrockFactory))
    }

    /// State with an explicit model client factory.
    pub fn with_models(
        config: ServerConfig,
        models: Arc<dyn ModelClientFactory>,
    ) -> Result<Self, GithubError> {
        let store = ConfigStore::new(config.config_path.clone(), config.config_defaults());
        let github = GithubClient::new(&config.github_api_url)?;
        let composer = PromptComposer::new(config.max_file_size());

        Ok(Self {
            config,
            store,
            github,
            models,
            composer,
        })
    }

    /// Resolve AWS settings: request, then stored config, then environment.
    pub fn aws_settings(&self, request: &AwsOverrides) -> Result<AwsSettings, ConfigStoreError> {
        let stored = self.store.load()?;
        Ok(resolve_aws_settings(request, &stored.aws, &self.config.aws_env))
    }

    /// Resolve the GitHub token: request, then stored config, then environment.
    /// A stored document that cannot be read is skipped.
    pub fn github_token(&self, requested: Option<&str>) -> Option<String> {
        if let Some(token) = requested.filter(|t| !t.is_empty()) {
            return Some(token.to_string());
        }

        let stored = match self.store.load() {
            Ok(config) => Some(config.github.token),
            Err(e) => {
                tracing::warn!("could not read stored github token: {}", e);
                None
            }
        };

        stored
            .filter(|t| !t.is_empty())
            .or_else(|| self.config.github_token.clone())
    }
}
