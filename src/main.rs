//! # Domain Redirector
//!
//! Answers `GET /redirect/{pool_id}/{path}` with a `302 Found` to one domain
//! of a weighted pool, writing one structured record per resolution.
//!
//! ## Usage
//!
//! ```bash
//! # Start with defaults (pools from config/pools.json, port 8080)
//! domain-redirector
//!
//! # Custom settings and pool table
//! domain-redirector --config redirector.yaml --pools /etc/redirector/pools.json
//!
//! # Environment overrides
//! REDIRECTOR_PORT=9000 REDIRECTOR_LOG_FORMAT=json domain-redirector
//! ```

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use redirector_config::{load_pools, load_settings, LogFormatSetting, RecordOutput, RedirectorConfig};
use redirector_core::{NoopSink, RecordSink};
use redirector_routing::Resolver;
use redirector_server::{AppState, Server, ServerConfig};
use redirector_telemetry::{
    init_logging, FanoutSink, JsonLineSink, LogFormat, LoggingConfig, Metrics, TracingSink,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::cli::Cli;

/// Application entry point
#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match settings(&cli).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            std::process::exit(1);
        }
    };

    let logging = LoggingConfig::new()
        .with_level(config.logging.level.clone())
        .with_format(log_format(config.logging.format));
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting domain redirector"
    );

    if let Err(e) = run(config).await {
        error!(error = %format!("{e:#}"), "Redirector failed");
        std::process::exit(1);
    }
}

/// Resolve settings from file, environment and flags, in that order
async fn settings(cli: &Cli) -> Result<RedirectorConfig> {
    let mut config = load_settings(cli.config.as_deref())
        .await
        .context("failed to load settings")?;
    cli.apply(&mut config);
    config.validate().context("invalid settings")?;
    Ok(config)
}

async fn run(config: RedirectorConfig) -> Result<()> {
    let pools = load_pools(&config.pools_path)
        .await
        .with_context(|| format!("failed to load pools from {}", config.pools_path.display()))?;

    info!(
        pools = pools.len(),
        path = %config.pools_path.display(),
        "Pool table loaded"
    );

    let metrics = if config.logging.metrics {
        Some(Metrics::new().context("failed to create metrics")?)
    } else {
        None
    };

    let mut sink = FanoutSink::new().with(record_sink(config.logging.record_output));
    if let Some(metrics) = &metrics {
        sink = sink.with(Arc::new(metrics.clone()));
    }

    let resolver = Resolver::new(Arc::new(pools), Arc::new(sink));

    let mut state = AppState::builder()
        .resolver(resolver)
        .trust_forwarded_headers(config.server.trust_forwarded_headers);
    if let Some(metrics) = metrics {
        state = state.metrics(metrics);
    }

    let server_config = ServerConfig::new()
        .with_host(config.server.host.clone())
        .with_port(config.server.port);

    Server::new(server_config, state.build())
        .run()
        .await
        .context("server error")?;

    info!("Redirector shutdown complete");
    Ok(())
}

fn record_sink(output: RecordOutput) -> Arc<dyn RecordSink> {
    match output {
        RecordOutput::Stdout => Arc::new(JsonLineSink::stdout()),
        RecordOutput::Tracing => Arc::new(TracingSink),
        RecordOutput::Off => Arc::new(NoopSink),
    }
}

const fn log_format(setting: LogFormatSetting) -> LogFormat {
    match setting {
        LogFormatSetting::Pretty => LogFormat::Pretty,
        LogFormatSetting::Compact => LogFormat::Compact,
        LogFormatSetting::Json => LogFormat::Json,
    }
}
