//! Shared application state.

use redirector_core::PoolConfig;
use redirector_routing::Resolver;
use redirector_telemetry::Metrics;
use std::sync::Arc;

/// State shared by all handlers; cloned per request.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Resolver over the loaded pool table
    pub resolver: Resolver,
    /// Metrics exposed on `/metrics`, if enabled
    pub metrics: Option<Metrics>,
    /// Take the client address from `X-Forwarded-For` / `X-Real-IP`
    pub trust_forwarded_headers: bool,
}

impl AppState {
    /// Start building a state
    #[must_use]
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }
}

/// Builder for [`AppState`]
#[derive(Default)]
pub struct AppStateBuilder {
    resolver: Option<Resolver>,
    metrics: Option<Metrics>,
    trust_forwarded_headers: bool,
}

impl AppStateBuilder {
    /// Set the resolver
    #[must_use]
    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Enable the metrics endpoint
    #[must_use]
    pub fn metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Trust proxy headers for the client address
    #[must_use]
    pub fn trust_forwarded_headers(mut self, trust: bool) -> Self {
        self.trust_forwarded_headers = trust;
        self
    }

    /// Build the state; without a resolver every pool lookup fails
    #[must_use]
    pub fn build(self) -> AppState {
        AppState {
            resolver: self
                .resolver
                .unwrap_or_else(|| Resolver::without_records(Arc::new(PoolConfig::default()))),
            metrics: self.metrics,
            trust_forwarded_headers: self.trust_forwarded_headers,
        }
    }
}
