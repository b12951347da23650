//! Service settings.
//!
//! Precedence, lowest first: built-in defaults, optional settings file,
//! `REDIRECTOR_*` environment variables. The binary applies command-line flags
//! on top.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::format::ConfigFormat;

/// Environment variable names.
pub mod env_vars {
    /// Bind host
    pub const HOST: &str = "REDIRECTOR_HOST";
    /// Bind port
    pub const PORT: &str = "REDIRECTOR_PORT";
    /// Pool table path
    pub const POOLS: &str = "REDIRECTOR_POOLS";
    /// Log level / filter directive
    pub const LOG_LEVEL: &str = "REDIRECTOR_LOG_LEVEL";
    /// Log format
    pub const LOG_FORMAT: &str = "REDIRECTOR_LOG_FORMAT";
    /// Where resolution records go
    pub const RECORD_OUTPUT: &str = "REDIRECTOR_RECORD_OUTPUT";
    /// Trust `X-Forwarded-For` / `X-Real-IP`
    pub const TRUST_FORWARDED: &str = "REDIRECTOR_TRUST_FORWARDED";
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Take the client address from proxy headers
    pub trust_forwarded_headers: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            trust_forwarded_headers: false,
        }
    }
}

impl ServerSettings {
    /// `host:port` string suitable for binding
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Operational log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    /// Multi-line human readable
    #[default]
    Pretty,
    /// Single-line human readable
    Compact,
    /// JSON lines
    Json,
}

impl FromStr for LogFormatSetting {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format {other:?} (expected pretty, compact or json)")),
        }
    }
}

/// Destination of resolution records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordOutput {
    /// One JSON object per line on stdout
    #[default]
    Stdout,
    /// Through the `tracing` subscriber
    Tracing,
    /// Discarded
    Off,
}

impl FromStr for RecordOutput {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "tracing" => Ok(Self::Tracing),
            "off" | "none" => Ok(Self::Off),
            other => Err(format!("unknown record output {other:?} (expected stdout, tracing or off)")),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive, e.g. `info` or `redirector_routing=debug`
    pub level: String,
    /// Operational log format
    pub format: LogFormatSetting,
    /// Resolution record destination
    pub record_output: RecordOutput,
    /// Expose Prometheus counters on `/metrics`
    pub metrics: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormatSetting::default(),
            record_output: RecordOutput::default(),
            metrics: true,
        }
    }
}

/// Complete service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectorConfig {
    /// Listener
    pub server: ServerSettings,
    /// Logging and records
    pub logging: LoggingSettings,
    /// Pool table location
    pub pools_path: PathBuf,
}

impl Default for RedirectorConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            logging: LoggingSettings::default(),
            pools_path: PathBuf::from("config/pools.json"),
        }
    }
}

impl RedirectorConfig {
    /// Parse a settings document
    pub fn from_str_with_format(text: &str, format: ConfigFormat) -> Result<Self> {
        format.decode(text)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(env_vars::HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(env_vars::PORT) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::env(env_vars::PORT, format!("not a port number: {port:?}")))?;
        }
        if let Some(path) = lookup(env_vars::POOLS) {
            self.pools_path = PathBuf::from(path);
        }
        if let Some(level) = lookup(env_vars::LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(format) = lookup(env_vars::LOG_FORMAT) {
            self.logging.format = format
                .parse()
                .map_err(|e: String| ConfigError::env(env_vars::LOG_FORMAT, e))?;
        }
        if let Some(output) = lookup(env_vars::RECORD_OUTPUT) {
            self.logging.record_output = output
                .parse()
                .map_err(|e: String| ConfigError::env(env_vars::RECORD_OUTPUT, e))?;
        }
        if let Some(trust) = lookup(env_vars::TRUST_FORWARDED) {
            self.server.trust_forwarded_headers = parse_bool(&trust)
                .ok_or_else(|| ConfigError::env(env_vars::TRUST_FORWARDED, format!("not a boolean: {trust:?}")))?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::invalid("server.host must not be empty"));
        }
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port must be greater than 0"));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid("logging.level must not be empty"));
        }
        if self.pools_path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("pools_path must not be empty"));
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Load settings: defaults, then `path` when given, then the environment.
pub async fn load_settings(path: Option<&Path>) -> Result<RedirectorConfig> {
    let mut config = match path {
        Some(path) => {
            let text = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
            debug!(path = %path.display(), "Reading settings file");
            RedirectorConfig::from_str_with_format(&text, ConfigFormat::from_path(path))?
        }
        None => RedirectorConfig::default(),
    };

    config.apply_env_overrides()?;
    config.validate()?;
    Ok(config)
}
