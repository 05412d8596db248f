// ABOUTME: Serializable data model for configuration documents and prompt requests/results.
// ABOUTME: Every field is defaulted on read so partial documents and sparse requests parse cleanly.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// AWS region used when neither the request, the stored config, nor the environment name one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Bedrock model used when no other source names one.
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";

/// Stored AWS credentials and model selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(default, deserialize_with = "lenient")]
    pub access_key_id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub secret_access_key: String,
    #[serde(default, deserialize_with = "lenient")]
    pub region: String,
    #[serde(default, deserialize_with = "lenient")]
    pub model_id: String,
}

/// Stored GitHub token and the repository used for connection checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GithubConfig {
    #[serde(default, deserialize_with = "lenient")]
    pub token: String,
    #[serde(default, deserialize_with = "lenient")]
    pub default_repo: String,
}

/// UI defaults for the prompt builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_task_type", deserialize_with = "lenient_task_type")]
    pub default_task_type: String,
    #[serde(default = "default_true", deserialize_with = "lenient_flag")]
    pub include_context_by_default: bool,
    #[serde(default = "default_true", deserialize_with = "lenient_flag")]
    pub include_requirements_by_default: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_task_type: default_task_type(),
            include_context_by_default: true,
            include_requirements_by_default: true,
        }
    }
}

/// Typed view of the user configuration document.
///
/// Fields this struct does not know about are kept in `extra` so a typed
/// read followed by a write never drops data. The document is stored
/// verbatim, so known fields holding null or the wrong type read as absent
/// instead of failing the whole read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default, deserialize_with = "lenient")]
    pub aws: AwsConfig,
    #[serde(default, deserialize_with = "lenient")]
    pub github: GithubConfig,
    #[serde(default, deserialize_with = "lenient_requirements")]
    pub non_functional_requirements: BTreeMap<String, Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub preferences: Preferences,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Configuration {
    /// Requirements stored for a task type. Unknown task types yield an empty list.
    pub fn requirements_for(&self, task_type: &str) -> Vec<String> {
        self.non_functional_requirements
            .get(task_type)
            .cloned()
            .unwrap_or_default()
    }
}

/// A file the user picked in the client. Content is fetched on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSelection {
    #[serde(default)]
    pub path: String,
    #[serde(rename = "type", default)]
    pub file_type: String,
}

impl FileSelection {
    pub fn new(path: impl Into<String>, file_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            file_type: file_type.into(),
        }
    }
}

/// Request body for the context-enriched prompt builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptBuildRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_task_type")]
    pub task_type: String,
    #[serde(default)]
    pub selected_files: Vec<FileSelection>,
    #[serde(default = "default_true")]
    pub include_context: bool,
    #[serde(default = "default_true")]
    pub include_requirements: bool,
}

/// Result of the context-enriched prompt builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedPrompt {
    pub final_prompt: String,
    pub context_included: bool,
    pub requirements_included: bool,
    pub files_processed: usize,
    pub requirements_applied: usize,
}

/// Request body for AI enhancement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhanceRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_task_type")]
    pub task_type: String,
    #[serde(default)]
    pub selected_files: Vec<FileSelection>,
}

/// Result of AI enhancement, or of the deterministic fallback when the model is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedPrompt {
    pub enhanced_prompt: String,
    pub original_prompt: String,
    pub task_type: String,
    pub requirements_applied: usize,
    pub ai_enhanced: bool,
    pub fallback_used: bool,
}

/// String items of a stored requirement list. Anything that is not an
/// array yields no requirements; non-string items are skipped.
pub fn requirement_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Requirements map of a raw document. Entries that are not arrays are dropped.
pub fn requirements_map(section: &Value) -> BTreeMap<String, Vec<String>> {
    section
        .as_object()
        .map(|map| {
            map.iter()
                .filter(|(_, list)| list.is_array())
                .map(|(task_type, list)| (task_type.clone(), requirement_list(list)))
                .collect()
        })
        .unwrap_or_default()
}

fn default_task_type() -> String {
    "development".to_string()
}

fn default_true() -> bool {
    true
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_task_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(default_task_type))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool().unwrap_or_else(default_true))
}

fn lenient_requirements<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(requirements_map(&value))
}
