//! Document format detection and decoding.

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::{ConfigError, Result};

/// Supported configuration document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    /// JSON document
    #[default]
    Json,
    /// YAML document
    Yaml,
    /// TOML document
    Toml,
}

impl ConfigFormat {
    /// Detect the format from a file extension; unknown extensions read as JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => Self::Yaml,
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }

    /// Format name used in error messages
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
            Self::Toml => "TOML",
        }
    }

    /// Decode `text` as this format
    pub fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        match self {
            Self::Json => serde_json::from_str(text).map_err(|e| ConfigError::parse(self.name(), e)),
            Self::Yaml => serde_yaml::from_str(text).map_err(|e| ConfigError::parse(self.name(), e)),
            Self::Toml => toml::from_str(text).map_err(|e| ConfigError::parse(self.name(), e)),
        }
    }
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
