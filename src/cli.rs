//! Command-line arguments.

use clap::Parser;
use redirector_config::{LogFormatSetting, RecordOutput, RedirectorConfig};
use std::path::PathBuf;

/// Weighted redirect dispatcher for equivalent-content domain pools
#[derive(Parser, Debug)]
#[command(name = "domain-redirector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Settings file (JSON, YAML or TOML)
    #[arg(short, long, env = "REDIRECTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Pool table file, overrides `pools_path`
    #[arg(short, long)]
    pub pools: Option<PathBuf>,

    /// Bind host
    #[arg(long)]
    pub host: Option<String>,

    /// Bind port
    #[arg(long)]
    pub port: Option<u16>,

    /// Log filter directive, e.g. `info` or `redirector_routing=debug`
    #[arg(long)]
    pub log_level: Option<String>,

    /// Operational log format: pretty, compact or json
    #[arg(long)]
    pub log_format: Option<LogFormatSetting>,

    /// Resolution record destination: stdout, tracing or off
    #[arg(long)]
    pub records: Option<RecordOutput>,

    /// Take the client address from X-Forwarded-For / X-Real-IP
    #[arg(long)]
    pub trust_forwarded_headers: bool,

    /// Disable the `/metrics` endpoint
    #[arg(long)]
    pub no_metrics: bool,
}

impl Cli {
    /// Apply flags on top of file and environment settings
    pub fn apply(&self, config: &mut RedirectorConfig) {
        if let Some(pools) = &self.pools {
            config.pools_path.clone_from(pools);
        }
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(level) = &self.log_level {
            config.logging.level.clone_from(level);
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(records) = self.records {
            config.logging.record_output = records;
        }
        if self.trust_forwarded_headers {
            config.server.trust_forwarded_headers = true;
        }
        if self.no_metrics {
            config.logging.metrics = false;
        }
    }
}
