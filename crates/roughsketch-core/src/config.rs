//! Conversion settings.

use crate::drawable::StyleOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

fn default_name_prefix() -> String {
    "Rough ".to_string()
}

fn default_true() -> bool {
    true
}

/// Settings for converting document layers into rough renderings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SketchConfig {
    /// Prefix prepended to the source layer's name.
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
    /// Hide the source layer after conversion.
    #[serde(default = "default_true")]
    pub hide_original: bool,
    /// Select the generated group after conversion.
    #[serde(default = "default_true")]
    pub select_result: bool,
    /// Options that resolved styles fall back to.
    #[serde(default)]
    pub default_options: StyleOptions,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            name_prefix: default_name_prefix(),
            hide_original: true,
            select_result: true,
            default_options: StyleOptions::default(),
        }
    }
}

impl SketchConfig {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Display name for the group generated from `source_name`.
    pub fn display_name(&self, source_name: &str) -> String {
        format!("{}{}", self.name_prefix, source_name)
    }
}
