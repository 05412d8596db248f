// ABOUTME: Flat JSON file store for the user configuration document.
// ABOUTME: Reads fall back to a generated default; writes replace the whole document atomically.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use thiserror::Error;

use crate::model::{
    AwsConfig, Configuration, DEFAULT_MODEL_ID, DEFAULT_REGION, GithubConfig, Preferences,
    requirement_list, requirements_map,
};

/// Errors that can occur while reading or writing the config document.
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration must be a JSON object")]
    NotAnObject,
}

/// Values baked into the default document when no file exists yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDefaults {
    pub region: String,
    pub model_id: String,
    pub default_task_type: String,
}

impl Default for ConfigDefaults {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            default_task_type: "development".to_string(),
        }
    }
}

/// JSON document store backed by a single file.
///
/// All access goes through one in-process lock so a read-modify-write such
/// as [`ConfigStore::update_requirements`] cannot interleave with another
/// request. Other processes writing the same file still race; last write wins.
pub struct ConfigStore {
    path: PathBuf,
    defaults: ConfigDefaults,
    lock: Mutex<()>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>, defaults: ConfigDefaults) -> Self {
        Self {
            path: path.into(),
            defaults,
            lock: Mutex::new(()),
        }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The document served when nothing has been written yet.
    pub fn default_document(&self) -> Configuration {
        Configuration {
            aws: AwsConfig {
                access_key_id: String::new(),
                secret_access_key: String::new(),
                region: self.defaults.region.clone(),
                model_id: self.defaults.model_id.clone(),
            },
            github: GithubConfig::default(),
            non_functional_requirements: BTreeMap::new(),
            preferences: Preferences {
                default_task_type: self.defaults.default_task_type.clone(),
                include_context_by_default: true,
                include_requirements_by_default: true,
            },
            extra: Default::default(),
        }
    }

    /// Read the raw document exactly as stored, or the default document if the file is absent.
    pub fn read_document(&self) -> Result<Value, ConfigStoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_unlocked()
    }

    /// Replace the stored document with `document`, verbatim.
    pub fn write_document(&self, document: Value) -> Result<Value, ConfigStoreError> {
        if !document.is_object() {
            return Err(ConfigStoreError::NotAnObject);
        }
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_unlocked(&document)?;
        Ok(document)
    }

    /// Typed view of the current document.
    pub fn load(&self) -> Result<Configuration, ConfigStoreError> {
        let document = self.read_document()?;
        Ok(serde_json::from_value(document)?)
    }

    /// Requirements stored for `task_type`, empty when none are configured.
    /// Only the task's own entry is inspected; other sections may hold anything.
    pub fn requirements_for(&self, task_type: &str) -> Result<Vec<String>, ConfigStoreError> {
        let document = self.read_document()?;
        Ok(requirement_list(
            &document["non_functional_requirements"][task_type],
        ))
    }

    /// Replace the requirement list of one task type and persist the whole document.
    /// Returns the full requirements map after the update.
    pub fn update_requirements(
        &self,
        task_type: &str,
        requirements: Vec<String>,
    ) -> Result<BTreeMap<String, Vec<String>>, ConfigStoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut document = self.read_unlocked()?;
        let root = document
            .as_object_mut()
            .ok_or(ConfigStoreError::NotAnObject)?;

        let section = root
            .entry("non_functional_requirements")
            .or_insert_with(|| Value::Object(Default::default()));
        if !section.is_object() {
            *section = Value::Object(Default::default());
        }
        if let Some(map) = section.as_object_mut() {
            map.insert(task_type.to_string(), serde_json::to_value(&requirements)?);
        }

        let updated = requirements_map(&root["non_functional_requirements"]);

        self.write_unlocked(&document)?;
        tracing::debug!(task_type, count = requirements.len(), "requirements updated");

        Ok(updated)
    }

    fn read_unlocked(&self) -> Result<Value, ConfigStoreError> {
        if !self.path.exists() {
            return Ok(serde_json::to_value(self.default_document())?);
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write to a sibling temp file, fsync, then rename over the target.
    fn write_unlocked(&self, document: &Value) -> Result<(), ConfigStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(document)?;
        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}
