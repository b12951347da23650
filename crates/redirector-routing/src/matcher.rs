//! Path-prefix matching for candidate lists.
//!
//! Prefixes are compared literally: `news` matches `news/a` and also
//! `newsxyz`. Rules are tried in declaration order and the first match wins,
//! even when a later rule has a longer prefix.

use redirector_core::{PathRule, PoolEntry, WeightedDomain};

/// First rule whose prefix starts `path`, in declaration order.
#[must_use]
pub fn matching_rule<'a>(entry: &'a PoolEntry, path: &str) -> Option<&'a PathRule> {
    entry
        .path_based_domains
        .iter()
        .find(|rule| path.starts_with(rule.prefix.as_str()))
}

/// Candidate list that applies to `path`.
///
/// A matching rule is used even if its list is empty; only when no rule
/// matches does the pool's default list apply.
#[must_use]
pub fn select_candidates<'a>(entry: &'a PoolEntry, path: &str) -> &'a [WeightedDomain] {
    matching_rule(entry, path).map_or(entry.domains.as_slice(), |rule| rule.domains.as_slice())
}
