//! # Redirector Telemetry
//!
//! Observability for the domain redirector.
//!
//! This crate provides:
//! - Operational logging setup (`tracing` subscriber on stderr)
//! - Sinks for resolution records (JSON lines, tracing, memory, fan-out)
//! - Prometheus counters derived from resolution records

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod logging;
pub mod metrics;
pub mod sinks;

// Re-export main types
pub use logging::{init_logging, LogFormat, LoggingConfig, TelemetryError};
pub use metrics::Metrics;
pub use sinks::{FanoutSink, JsonLineSink, MemorySink, TracingSink, RECORD_TARGET};
