//! Structured resolution records.
//!
//! Every resolution produces exactly one [`ResolutionRecord`], handed to the
//! [`RecordSink`] the resolver was built with. Serialized, a record is one flat
//! JSON object:
//!
//! ```json
//! {"pool_id":"pool1","requested_path":"news/a","client_ip":"127.0.0.1",
//!  "datetime":"2024-05-01T12:00:00.000000Z","event":"redirect",
//!  "redirected_to":"https://a.example/news/a","custom_headers":{}}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RedirectError;
use crate::resolution::ResolutionRequest;
use crate::types::CustomHeaders;

/// Kind of a resolution record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordEvent {
    /// A target URL was chosen
    Redirect,
    /// Resolution failed
    Error,
}

impl RecordEvent {
    /// Lowercase label as written in the `event` field
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redirect => "redirect",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for RecordEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event-specific part of a record, tagged by `event`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum RecordOutcome {
    /// Successful redirect
    Redirect {
        /// Chosen target URL
        redirected_to: String,
        /// Headers attached to the redirect
        custom_headers: CustomHeaders,
    },
    /// Failed resolution
    Error {
        /// Error returned to the caller, written as its message
        error_message: RedirectError,
    },
}

impl RecordOutcome {
    /// The failure carried by an error outcome
    #[must_use]
    pub fn error(&self) -> Option<RedirectError> {
        match self {
            Self::Redirect { .. } => None,
            Self::Error { error_message } => Some(*error_message),
        }
    }
}

/// One structured record per resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRecord {
    /// Requested pool identifier
    pub pool_id: String,
    /// Requested path
    pub requested_path: String,
    /// Client address
    pub client_ip: String,
    /// Time of the decision, UTC
    pub datetime: DateTime<Utc>,
    /// Event-specific fields
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

impl ResolutionRecord {
    /// Record a successful redirect for `request`.
    #[must_use]
    pub fn redirect(request: &ResolutionRequest<'_>, url: &str, headers: &CustomHeaders) -> Self {
        Self::with_outcome(
            request,
            RecordOutcome::Redirect {
                redirected_to: url.to_string(),
                custom_headers: headers.clone(),
            },
        )
    }

    /// Record a failed resolution for `request`.
    #[must_use]
    pub fn error(request: &ResolutionRequest<'_>, error: RedirectError) -> Self {
        Self::with_outcome(
            request,
            RecordOutcome::Error {
                error_message: error,
            },
        )
    }

    fn with_outcome(request: &ResolutionRequest<'_>, outcome: RecordOutcome) -> Self {
        Self {
            pool_id: request.pool_id.to_string(),
            requested_path: request.path.to_string(),
            client_ip: request.client_ip.to_string(),
            datetime: Utc::now(),
            outcome,
        }
    }

    /// Kind of this record
    #[must_use]
    pub fn event(&self) -> RecordEvent {
        match self.outcome {
            RecordOutcome::Redirect { .. } => RecordEvent::Redirect,
            RecordOutcome::Error { .. } => RecordEvent::Error,
        }
    }

    /// Whether this record reports a failure
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.event() == RecordEvent::Error
    }

    /// Serialize to a single-line JSON object
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Destination for resolution records.
///
/// Implementations must tolerate concurrent calls; the resolver invokes
/// `record` exactly once per resolution from whatever thread serves the
/// request.
pub trait RecordSink: Send + Sync {
    /// Accept one record
    fn record(&self, record: &ResolutionRecord);
}

/// Sink that discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl RecordSink for NoopSink {
    fn record(&self, _record: &ResolutionRecord) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_common_fields() {
        let request = ResolutionRequest::new("pool1", "path/").with_client_ip("127.0.0.1");
        let record = ResolutionRecord::error(&request, RedirectError::PoolNotFound);

        assert_eq!(record.pool_id, "pool1");
        assert_eq!(record.requested_path, "path/");
        assert_eq!(record.client_ip, "127.0.0.1");

        let age = Utc::now() - record.datetime;
        assert!(age.num_seconds().abs() < 60);
    }

    #[test]
    fn test_redirect_record_json_shape() {
        let request = ResolutionRequest::new("p", "x").with_client_ip("10.1.1.1");
        let mut headers = CustomHeaders::new();
        headers.insert("X-Custom-Header".to_string(), "Value".to_string());
        let record = ResolutionRecord::redirect(&request, "https://a.com/x", &headers);

        let json: Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(json["pool_id"], "p");
        assert_eq!(json["requested_path"], "x");
        assert_eq!(json["client_ip"], "10.1.1.1");
        assert_eq!(json["event"], "redirect");
        assert_eq!(json["redirected_to"], "https://a.com/x");
        assert_eq!(json["custom_headers"]["X-Custom-Header"], "Value");
        assert!(json.get("error_message").is_none());

        let datetime = json["datetime"].as_str().unwrap();
        let parsed = DateTime::parse_from_rfc3339(datetime).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_error_record_json_shape() {
        let request = ResolutionRequest::new("p", "x");
        let record = ResolutionRecord::error(&request, RedirectError::NoDomainsAvailable);
        assert_eq!(record.event(), RecordEvent::Error);
        assert!(record.is_error());

        let json: Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(json["event"], "error");
        assert_eq!(json["error_message"], "No domains available for redirection");
        assert!(json.get("redirected_to").is_none());
        assert!(json.get("custom_headers").is_none());
    }

    #[test]
    fn test_record_parses_back() {
        let request = ResolutionRequest::new("p", "x");
        let record = ResolutionRecord::redirect(&request, "https://a.com/x", &CustomHeaders::new());
        let line = record.to_json().unwrap();
        assert!(!line.contains('\n'));

        let parsed: ResolutionRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_error_record_parses_back() {
        let request = ResolutionRequest::new("p", "x");
        let record = ResolutionRecord::error(&request, RedirectError::PoolNotFound);

        let parsed: ResolutionRecord = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(parsed.outcome.error(), Some(RedirectError::PoolNotFound));
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(RecordEvent::Redirect.to_string(), "redirect");
        assert_eq!(RecordEvent::Error.to_string(), "error");
    }
}
