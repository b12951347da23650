//! # Redirector Config
//!
//! Configuration loading for the domain redirector.
//!
//! Two documents are loaded at startup:
//! - the pool table (JSON, YAML or TOML), validated before use
//! - the service settings (optional file, then `REDIRECTOR_*` environment overrides)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod pools;
pub mod settings;

pub use error::{ConfigError, Result};
pub use format::ConfigFormat;
pub use pools::{load_pools, parse_pools, validate_pools};
pub use settings::{
    load_settings, LogFormatSetting, LoggingSettings, RecordOutput, RedirectorConfig,
    ServerSettings,
};
