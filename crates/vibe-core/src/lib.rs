// ABOUTME: Core domain for vibe-assistant: configuration model, task types, and prompt composition.
// ABOUTME: Also owns the JSON config store and the local repository analyzer.

pub mod analyze;
pub mod compose;
pub mod model;
pub mod store;
pub mod task;

pub use analyze::{RepositoryAnalysis, analyze_repository};
pub use compose::{PromptComposer, fallback_enhance, format_requirements, selected_files_note};
pub use model::{
    AwsConfig, ComposedPrompt, Configuration, DEFAULT_MODEL_ID, DEFAULT_REGION, EnhanceRequest,
    EnhancedPrompt, FileSelection, GithubConfig, Preferences, PromptBuildRequest,
};
pub use store::{ConfigDefaults, ConfigStore, ConfigStoreError};
pub use task::TaskType;
