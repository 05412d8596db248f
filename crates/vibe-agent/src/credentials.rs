// ABOUTME: Resolves AWS credentials, region, and model id from layered sources.
// ABOUTME: Precedence is request > stored config > environment > built-in default, for every field.

use vibe_core::{AwsConfig, DEFAULT_MODEL_ID, DEFAULT_REGION};

/// Fully resolved settings handed to a model client factory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AwsSettings {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub model_id: String,
}

/// One optional layer of AWS settings. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AwsOverrides {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
    pub model_id: Option<String>,
}

impl AwsOverrides {
    /// Read the environment layer.
    ///
    /// - AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY
    /// - AWS_DEFAULT_REGION (falls back to AWS_REGION)
    /// - AWS_BEDROCK_MODEL_ID
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            access_key_id: var("AWS_ACCESS_KEY_ID"),
            secret_access_key: var("AWS_SECRET_ACCESS_KEY"),
            region: var("AWS_DEFAULT_REGION").or_else(|| var("AWS_REGION")),
            model_id: var("AWS_BEDROCK_MODEL_ID"),
        }
    }

    fn from_stored(stored: &AwsConfig) -> Self {
        Self {
            access_key_id: Some(stored.access_key_id.clone()),
            secret_access_key: Some(stored.secret_access_key.clone()),
            region: Some(stored.region.clone()),
            model_id: Some(stored.model_id.clone()),
        }
    }
}

/// Pick the first non-empty value for each field across the layers.
pub fn resolve_aws_settings(
    request: &AwsOverrides,
    stored: &AwsConfig,
    env: &AwsOverrides,
) -> AwsSettings {
    let stored = AwsOverrides::from_stored(stored);
    let layers = [request, &stored, env];

    let pick = |field: fn(&AwsOverrides) -> &Option<String>| -> Option<String> {
        layers
            .iter()
            .filter_map(|layer| field(layer).as_deref())
            .find(|v| !v.is_empty())
            .map(String::from)
    };

    AwsSettings {
        access_key_id: pick(|l| &l.access_key_id).unwrap_or_default(),
        secret_access_key: pick(|l| &l.secret_access_key).unwrap_or_default(),
        region: pick(|l| &l.region).unwrap_or_else(|| DEFAULT_REGION.to_string()),
        model_id: pick(|l| &l.model_id).unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
    }
}
