//! Record sinks.
//!
//! All sinks accept concurrent calls. A sink that fails to write logs the
//! failure through `tracing` and drops the record; resolution never fails
//! because of its record.

use parking_lot::Mutex;
use redirector_core::{RecordSink, ResolutionRecord};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Target used for records emitted through `tracing`.
pub const RECORD_TARGET: &str = "redirect_service";

/// Writes each record as one compact JSON object followed by a newline.
pub struct JsonLineSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLineSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl JsonLineSink<std::io::Stdout> {
    /// Sink writing to process stdout
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> RecordSink for JsonLineSink<W> {
    fn record(&self, record: &ResolutionRecord) {
        let line = match record.to_json() {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, pool_id = %record.pool_id, "Failed to serialize resolution record");
                return;
            }
        };

        let mut writer = self.writer.lock();
        if let Err(e) = writeln!(writer, "{line}").and_then(|()| writer.flush()) {
            warn!(error = %e, "Failed to write resolution record");
        }
    }
}

impl<W: Write + Send> std::fmt::Debug for JsonLineSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLineSink").finish_non_exhaustive()
    }
}

/// Emits records as `tracing` events at target [`RECORD_TARGET`].
///
/// Redirects are logged at `info`, failures at `error`; the message is the
/// record's JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl RecordSink for TracingSink {
    fn record(&self, record: &ResolutionRecord) {
        let json = match record.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, pool_id = %record.pool_id, "Failed to serialize resolution record");
                return;
            }
        };

        if record.is_error() {
            error!(
                target: RECORD_TARGET,
                event = %record.event(),
                pool_id = %record.pool_id,
                "{}",
                json
            );
        } else {
            info!(
                target: RECORD_TARGET,
                event = %record.event(),
                pool_id = %record.pool_id,
                "{}",
                json
            );
        }
    }
}

/// Bounded in-memory record buffer; oldest records are dropped first.
#[derive(Debug)]
pub struct MemorySink {
    capacity: usize,
    buffer: Mutex<VecDeque<ResolutionRecord>>,
}

impl MemorySink {
    /// Create a buffer holding at most `capacity` records
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            buffer: Mutex::new(VecDeque::new()),
        }
    }

    /// Copy of buffered records, oldest first
    #[must_use]
    pub fn records(&self) -> Vec<ResolutionRecord> {
        self.buffer.lock().iter().cloned().collect()
    }

    /// Most recent record
    #[must_use]
    pub fn last(&self) -> Option<ResolutionRecord> {
        self.buffer.lock().back().cloned()
    }

    /// Number of buffered records
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Whether the buffer is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    /// Drop all buffered records
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl RecordSink for MemorySink {
    fn record(&self, record: &ResolutionRecord) {
        let mut buffer = self.buffer.lock();
        while buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(record.clone());
    }
}

/// Forwards every record to each inner sink, in order.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn RecordSink>>,
}

impl FanoutSink {
    /// Create an empty fan-out
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn RecordSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of inner sinks
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether there are no inner sinks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl RecordSink for FanoutSink {
    fn record(&self, record: &ResolutionRecord) {
        for sink in &self.sinks {
            sink.record(record);
        }
    }
}

impl std::fmt::Debug for FanoutSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redirector_core::{CustomHeaders, RedirectError, ResolutionRequest};
    use serde_json::Value;
    use tracing::Level;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    #[derive(Clone, Default)]
    struct EventCapture(Arc<Mutex<Vec<(Level, String)>>>);

    impl<S: tracing::Subscriber> Layer<S> for EventCapture {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            let metadata = event.metadata();
            self.0.lock().push((*metadata.level(), metadata.target().to_string()));
        }
    }

    fn redirect_record(path: &str) -> ResolutionRecord {
        let request = ResolutionRequest::new("pool1", path).with_client_ip("127.0.0.1");
        ResolutionRecord::redirect(&request, &format!("https://a.com/{path}"), &CustomHeaders::new())
    }

    fn error_record() -> ResolutionRecord {
        ResolutionRecord::error(&ResolutionRequest::new("nope", "x"), RedirectError::PoolNotFound)
    }

    #[test]
    fn test_json_line_sink_one_object_per_line() {
        let sink = JsonLineSink::new(Vec::new());
        sink.record(&redirect_record("a"));
        sink.record(&error_record());

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(output.ends_with('\n'));

        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "redirect");
        assert_eq!(first["redirected_to"], "https://a.com/a");

        let second: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["event"], "error");
        assert_eq!(second["error_message"], "Pool not found");

        let datetime = second["datetime"].as_str().unwrap();
        let parsed = chrono::DateTime::parse_from_rfc3339(datetime).unwrap();
        assert!((chrono::Utc::now() - parsed.with_timezone(&chrono::Utc)).num_seconds() < 5);
    }

    #[test]
    fn test_memory_sink_bounded() {
        let sink = MemorySink::new(2);
        assert!(sink.is_empty());

        sink.record(&redirect_record("1"));
        sink.record(&redirect_record("2"));
        sink.record(&redirect_record("3"));

        let paths: Vec<String> = sink.records().into_iter().map(|r| r.requested_path).collect();
        assert_eq!(paths, vec!["2", "3"]);
        assert_eq!(sink.last().unwrap().requested_path, "3");

        sink.clear();
        assert_eq!(sink.len(), 0);
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let a = Arc::new(MemorySink::default());
        let b = Arc::new(MemorySink::default());
        let fanout = FanoutSink::new().with(a.clone()).with(b.clone());
        assert_eq!(fanout.len(), 2);

        fanout.record(&error_record());

        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_tracing_sink_levels_and_target() {
        let capture = EventCapture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());

        tracing::subscriber::with_default(subscriber, || {
            TracingSink.record(&redirect_record("x"));
            TracingSink.record(&error_record());
            TracingSink.record(&ResolutionRecord::error(
                &ResolutionRequest::new("pool1", "x"),
                RedirectError::NoDomainsAvailable,
            ));
        });

        let events = capture.0.lock().clone();
        assert_eq!(
            events,
            vec![
                (Level::INFO, RECORD_TARGET.to_string()),
                (Level::ERROR, RECORD_TARGET.to_string()),
                (Level::ERROR, RECORD_TARGET.to_string()),
            ]
        );
    }

    #[test]
    fn test_tracing_sink_does_not_panic_without_subscriber() {
        TracingSink.record(&redirect_record("x"));
        TracingSink.record(&error_record());
    }
}
