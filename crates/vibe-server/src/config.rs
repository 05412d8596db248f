// ABOUTME: Server configuration loaded from environment variables with defaults and validation.
// ABOUTME: Also captures the environment layer of AWS settings and the fallback GitHub token.

use std::path::PathBuf;

use thiserror::Error;
use vibe_agent::AwsOverrides;
use vibe_core::{ConfigDefaults, DEFAULT_MODEL_ID, DEFAULT_REGION};
use vibe_github::DEFAULT_API_URL;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ServerConfigError {
    #[error("PORT is not a valid port number: {0}")]
    InvalidPort(String),

    #[error("HOST must not be empty")]
    EmptyHost,

    #[error("MAX_FILE_SIZE_KB is not a valid number: {0}")]
    InvalidMaxFileSize(String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub config_path: PathBuf,
    pub max_file_size_kb: u64,
    pub default_task_type: String,
    pub github_token: Option<String>,
    pub github_api_url: String,
    pub aws_env: AwsOverrides,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            debug: true,
            config_path: PathBuf::from("config/user_config.json"),
            max_file_size_kb: 100,
            default_task_type: "development".to_string(),
            github_token: None,
            github_api_url: DEFAULT_API_URL.to_string(),
            aws_env: AwsOverrides::default(),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - HOST (default: 0.0.0.0), PORT (default: 5000)
    /// - VIBE_DEBUG: verbose logging (default: true)
    /// - CONFIG_FILE_PATH: user config document (default: config/user_config.json)
    /// - MAX_FILE_SIZE_KB: cap for inlined files (default: 100)
    /// - DEFAULT_TASK_TYPE (default: development)
    /// - GITHUB_TOKEN, GITHUB_API_URL
    /// - AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_DEFAULT_REGION, AWS_BEDROCK_MODEL_ID
    pub fn from_env() -> Result<Self, ServerConfigError> {
        let defaults = Self::default();

        let host = match std::env::var("HOST") {
            Ok(h) if h.trim().is_empty() => return Err(ServerConfigError::EmptyHost),
            Ok(h) => h,
            Err(_) => defaults.host,
        };

        let port = match env_var("PORT") {
            Some(p) => p
                .parse::<u16>()
                .map_err(|_| ServerConfigError::InvalidPort(p))?,
            None => defaults.port,
        };

        let max_file_size_kb = match env_var("MAX_FILE_SIZE_KB") {
            Some(v) => v
                .parse::<u64>()
                .map_err(|_| ServerConfigError::InvalidMaxFileSize(v))?,
            None => defaults.max_file_size_kb,
        };

        let debug = env_var("VIBE_DEBUG")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(defaults.debug);

        Ok(Self {
            host,
            port,
            debug,
            config_path: env_var("CONFIG_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.config_path),
            max_file_size_kb,
            default_task_type: env_var("DEFAULT_TASK_TYPE").unwrap_or(defaults.default_task_type),
            github_token: env_var("GITHUB_TOKEN"),
            github_api_url: env_var("GITHUB_API_URL").unwrap_or(defaults.github_api_url),
            aws_env: AwsOverrides::from_env(),
        })
    }

    /// Address string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Cap for inlined file content, in bytes.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size_kb.saturating_mul(1024)
    }

    /// Values used for the config document when none has been written yet.
    pub fn config_defaults(&self) -> ConfigDefaults {
        ConfigDefaults {
            region: self
                .aws_env
                .region
                .clone()
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            model_id: self
                .aws_env
                .model_id
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            default_task_type: self.default_task_type.clone(),
        }
    }
}
