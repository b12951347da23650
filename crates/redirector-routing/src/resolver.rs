//! Redirection resolver.
//!
//! Turns a [`ResolutionRequest`] and a [`PoolConfig`] snapshot into either a
//! [`Redirect`] or a [`RedirectError`]:
//!
//! 1. look up the pool (`PoolNotFound` when absent)
//! 2. pick the candidate list by ordered literal path prefix
//! 3. choose one domain by weight (`NoDomainsAvailable` when nothing is selectable)
//! 4. build `https://{domain}/{path}[?{query}]` and attach the pool's headers
//!
//! Exactly one [`ResolutionRecord`] is handed to the sink per call, on success
//! and on failure alike.

use std::sync::Arc;

use rand::Rng;
use redirector_core::{
    NoopSink, PoolConfig, RecordSink, Redirect, RedirectError, RedirectResult, ResolutionRecord,
    ResolutionRequest,
};
use tracing::debug;

use crate::matcher::select_candidates;
use crate::selector::choose_weighted;

/// Build the redirect target for `domain`.
///
/// The query string is appended verbatim; callers pass it already encoded.
#[must_use]
pub fn build_target_url(domain: &str, path: &str, query: &str) -> String {
    if query.is_empty() {
        format!("https://{domain}/{path}")
    } else {
        format!("https://{domain}/{path}?{query}")
    }
}

/// Resolve `request` against `pools` using the thread-local RNG.
pub fn resolve(
    pools: &PoolConfig,
    request: &ResolutionRequest<'_>,
    sink: &dyn RecordSink,
) -> RedirectResult<Redirect> {
    resolve_with_rng(pools, request, sink, &mut rand::thread_rng())
}

/// Resolve `request` against `pools` drawing from `rng`.
pub fn resolve_with_rng<R>(
    pools: &PoolConfig,
    request: &ResolutionRequest<'_>,
    sink: &dyn RecordSink,
    rng: &mut R,
) -> RedirectResult<Redirect>
where
    R: Rng + ?Sized,
{
    let result = decide(pools, request, rng);

    let record = match &result {
        Ok(redirect) => ResolutionRecord::redirect(request, &redirect.url, &redirect.headers),
        Err(error) => ResolutionRecord::error(request, *error),
    };
    sink.record(&record);

    result
}

fn decide<R>(pools: &PoolConfig, request: &ResolutionRequest<'_>, rng: &mut R) -> RedirectResult<Redirect>
where
    R: Rng + ?Sized,
{
    let Some(entry) = pools.get(request.pool_id) else {
        debug!(pool_id = %request.pool_id, "Unknown pool");
        return Err(RedirectError::PoolNotFound);
    };

    // a configured pool with no domains at all is NoDomainsAvailable, not PoolNotFound
    let candidates = select_candidates(entry, request.path);

    let Some(chosen) = choose_weighted(candidates, rng) else {
        debug!(
            pool_id = %request.pool_id,
            path = %request.path,
            candidates = candidates.len(),
            "No selectable domain"
        );
        return Err(RedirectError::NoDomainsAvailable);
    };

    let url = build_target_url(&chosen.domain, request.path, request.query);

    debug!(
        pool_id = %request.pool_id,
        domain = %chosen.domain,
        url = %url,
        "Resolved redirect"
    );

    Ok(Redirect {
        url,
        headers: entry.custom_headers.clone(),
    })
}

/// Resolver bound to a pool table and a record sink.
///
/// Holds only read-only state behind `Arc`s; clones share the pool table.
#[derive(Clone)]
pub struct Resolver {
    pools: Arc<PoolConfig>,
    sink: Arc<dyn RecordSink>,
}

impl Resolver {
    /// Create a resolver that emits records to `sink`
    #[must_use]
    pub fn new(pools: Arc<PoolConfig>, sink: Arc<dyn RecordSink>) -> Self {
        Self { pools, sink }
    }

    /// Create a resolver that discards records
    #[must_use]
    pub fn without_records(pools: Arc<PoolConfig>) -> Self {
        Self::new(pools, Arc::new(NoopSink))
    }

    /// The pool table this resolver reads
    #[must_use]
    pub fn pools(&self) -> &PoolConfig {
        &self.pools
    }

    /// Resolve using the thread-local RNG
    pub fn resolve(&self, request: &ResolutionRequest<'_>) -> RedirectResult<Redirect> {
        resolve(&self.pools, request, self.sink.as_ref())
    }

    /// Resolve drawing from `rng`
    pub fn resolve_with_rng<R>(&self, request: &ResolutionRequest<'_>, rng: &mut R) -> RedirectResult<Redirect>
    where
        R: Rng + ?Sized,
    {
        resolve_with_rng(&self.pools, request, self.sink.as_ref(), rng)
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("pools", &self.pools.len())
            .finish_non_exhaustive()
    }
}
