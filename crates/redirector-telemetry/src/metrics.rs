//! Prometheus counters for resolutions.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use redirector_core::{RecordEvent, RecordSink, RedirectError, ResolutionRecord};
use tracing::warn;

use crate::logging::TelemetryError;

/// Label used for pool ids that are not configured.
///
/// Unknown ids come straight from request paths, so they are collapsed into
/// one series.
pub const UNKNOWN_POOL_LABEL: &str = "_unknown";

/// Resolution metrics.
///
/// Also a [`RecordSink`]: each record bumps
/// `redirector_resolutions_total{pool_id, event}`.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    resolutions: IntCounterVec,
}

impl Metrics {
    /// Create a metrics set with its own registry
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        let resolutions = IntCounterVec::new(
            Opts::new(
                "redirector_resolutions_total",
                "Resolutions by pool and outcome",
            ),
            &["pool_id", "event"],
        )?;
        registry.register(Box::new(resolutions.clone()))?;

        Ok(Self {
            registry,
            resolutions,
        })
    }

    /// Count one record
    pub fn observe(&self, record: &ResolutionRecord) {
        let pool_label = match record.outcome.error() {
            Some(RedirectError::PoolNotFound) => UNKNOWN_POOL_LABEL,
            _ => record.pool_id.as_str(),
        };

        self.resolutions
            .with_label_values(&[pool_label, record.event().as_str()])
            .inc();
    }

    /// Current count for a pool and event kind
    #[must_use]
    pub fn resolution_count(&self, pool_id: &str, event: RecordEvent) -> u64 {
        self.resolutions
            .with_label_values(&[pool_id, event.as_str()])
            .get()
    }

    /// Render all metrics in the Prometheus text format
    #[must_use]
    pub fn gather(&self) -> String {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();

        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
            return String::new();
        }

        String::from_utf8(buffer).unwrap_or_default()
    }
}

impl RecordSink for Metrics {
    fn record(&self, record: &ResolutionRecord) {
        self.observe(record);
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redirector_core::{CustomHeaders, ResolutionRequest};

    #[test]
    fn test_counts_by_pool_and_event() {
        let metrics = Metrics::new().unwrap();
        let request = ResolutionRequest::new("pool1", "x");

        metrics.record(&ResolutionRecord::redirect(&request, "https://a.com/x", &CustomHeaders::new()));
        metrics.record(&ResolutionRecord::redirect(&request, "https://b.com/x", &CustomHeaders::new()));
        metrics.record(&ResolutionRecord::error(&request, RedirectError::NoDomainsAvailable));

        assert_eq!(metrics.resolution_count("pool1", RecordEvent::Redirect), 2);
        assert_eq!(metrics.resolution_count("pool1", RecordEvent::Error), 1);
    }

    #[test]
    fn test_unknown_pools_collapse() {
        let metrics = Metrics::new().unwrap();
        for pool_id in ["a", "b", "c"] {
            let request = ResolutionRequest::new(pool_id, "x");
            metrics.record(&ResolutionRecord::error(&request, RedirectError::PoolNotFound));
        }

        assert_eq!(metrics.resolution_count(UNKNOWN_POOL_LABEL, RecordEvent::Error), 3);
        assert_eq!(metrics.resolution_count("a", RecordEvent::Error), 0);
    }

    #[test]
    fn test_gather_text_format() {
        let metrics = Metrics::new().unwrap();
        let request = ResolutionRequest::new("pool1", "x");
        metrics.observe(&ResolutionRecord::redirect(&request, "https://a.com/x", &CustomHeaders::new()));

        let text = metrics.gather();
        assert!(text.contains("redirector_resolutions_total"));
        assert!(text.contains(r#"pool_id="pool1""#));
    }
}
