// ABOUTME: Hosted-model layer for vibe-assistant: client trait, Bedrock adapter, and AI prompt operations.
// ABOUTME: Handlers depend on ModelClientFactory so tests can swap in the stub from `testing`.

pub mod bedrock;
pub mod credentials;
pub mod enhance;
pub mod runtime;
pub mod testing;

pub use bedrock::{BedrockClient, BedrockFactory};
pub use credentials::{AwsOverrides, AwsSettings, resolve_aws_settings};
pub use enhance::{
    ai_enhance, analyze_task_type, chat, chat_request, enhance, enhance_prompt,
    extract_relevant_requirements, test_connection,
};
pub use runtime::{InvokeRequest, ModelClient, ModelClientFactory, ModelError};
