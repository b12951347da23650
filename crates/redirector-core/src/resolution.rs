//! Per-request resolution input and output.

use serde::Serialize;

use crate::types::CustomHeaders;

/// Inputs of a single resolution, borrowed from the inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionRequest<'a> {
    /// Pool identifier from the request path
    pub pool_id: &'a str,
    /// Remaining request path, without leading slash
    pub path: &'a str,
    /// Raw query string, empty when absent
    pub query: &'a str,
    /// Client address as reported by the HTTP layer
    pub client_ip: &'a str,
}

impl<'a> ResolutionRequest<'a> {
    /// Create a request with empty query and unknown client
    #[must_use]
    pub fn new(pool_id: &'a str, path: &'a str) -> Self {
        Self {
            pool_id,
            path,
            query: "",
            client_ip: "unknown",
        }
    }

    /// Set the raw query string
    #[must_use]
    pub fn with_query(mut self, query: &'a str) -> Self {
        self.query = query;
        self
    }

    /// Set the client address
    #[must_use]
    pub fn with_client_ip(mut self, client_ip: &'a str) -> Self {
        self.client_ip = client_ip;
        self
    }
}

/// Successful resolution: where to send the client and what to attach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    /// Absolute target URL
    pub url: String,
    /// Custom response headers from the pool
    pub headers: CustomHeaders,
}
