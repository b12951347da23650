//! Configuration error types.

use std::path::PathBuf;

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration error type.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Document could not be parsed.
    #[error("Failed to parse {format} document: {message}")]
    Parse {
        /// Format that was attempted
        format: &'static str,
        /// Parser message
        message: String,
    },

    /// Document parsed but failed validation.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Environment variable held an unusable value.
    #[error("Invalid value for {var}: {message}")]
    Env {
        /// Variable name
        var: String,
        /// What was wrong
        message: String,
    },
}

impl ConfigError {
    /// Create a validation error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Create an environment error.
    pub fn env(var: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Env {
            var: var.into(),
            message: msg.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(format: &'static str, msg: impl ToString) -> Self {
        Self::Parse {
            format,
            message: msg.to_string(),
        }
    }
}
