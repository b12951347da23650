//! Pool configuration model.
//!
//! A [`PoolConfig`] maps pool identifiers to [`PoolEntry`] values. Each entry
//! carries a default candidate list, an ordered list of path-prefix overrides
//! and the custom headers attached to every redirect issued from the pool.
//!
//! The on-disk shape is:
//!
//! ```json
//! {
//!   "pool1": {
//!     "domains": [["a.example", 2], ["b.example", 1]],
//!     "path_based_domains": { "news/": [["c.example", 1]] },
//!     "custom_headers": { "X-Pool": "pool1" }
//!   }
//! }
//! ```

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Header name to value mapping attached to redirects.
pub type CustomHeaders = BTreeMap<String, String>;

/// A candidate domain with its selection weight.
///
/// Serialized as a two-element array `[domain, weight]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, f64)", into = "(String, f64)")]
pub struct WeightedDomain {
    /// Destination host name
    pub domain: String,
    /// Relative selection weight
    pub weight: f64,
}

impl WeightedDomain {
    /// Create a new weighted domain
    pub fn new(domain: impl Into<String>, weight: f64) -> Self {
        Self {
            domain: domain.into(),
            weight,
        }
    }

    /// Whether this candidate can ever be chosen.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.weight.is_finite() && self.weight > 0.0
    }
}

impl From<(String, f64)> for WeightedDomain {
    fn from((domain, weight): (String, f64)) -> Self {
        Self { domain, weight }
    }
}

impl From<WeightedDomain> for (String, f64) {
    fn from(value: WeightedDomain) -> Self {
        (value.domain, value.weight)
    }
}

/// A path-prefix override.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRule {
    /// Literal prefix compared against the request path
    pub prefix: String,
    /// Candidates used when the prefix matches
    pub domains: Vec<WeightedDomain>,
}

impl PathRule {
    /// Create a new path rule
    pub fn new(prefix: impl Into<String>, domains: Vec<WeightedDomain>) -> Self {
        Self {
            prefix: prefix.into(),
            domains,
        }
    }
}

/// Path rules in declaration order.
///
/// Serialized as an object keyed by prefix. Deserialization keeps the order in
/// which keys appear in the source document, which decides precedence when
/// several prefixes match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathRules(Vec<PathRule>);

impl PathRules {
    /// Create an empty rule list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule after all existing ones
    pub fn push(&mut self, rule: PathRule) {
        self.0.push(rule);
    }

    /// Iterate rules in declaration order
    pub fn iter(&self) -> std::slice::Iter<'_, PathRule> {
        self.0.iter()
    }

    /// Number of rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no rules
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<PathRule>> for PathRules {
    fn from(rules: Vec<PathRule>) -> Self {
        Self(rules)
    }
}

impl<'a> IntoIterator for &'a PathRules {
    type Item = &'a PathRule;
    type IntoIter = std::slice::Iter<'a, PathRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for PathRules {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for rule in &self.0 {
            map.serialize_entry(&rule.prefix, &rule.domains)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PathRules {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RulesVisitor;

        impl<'de> Visitor<'de> for RulesVisitor {
            type Value = PathRules;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of path prefix to [domain, weight] pairs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<PathRules, A::Error> {
                let mut rules = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((prefix, domains)) =
                    map.next_entry::<String, Vec<WeightedDomain>>()?
                {
                    rules.push(PathRule { prefix, domains });
                }
                Ok(PathRules(rules))
            }
        }

        deserializer.deserialize_map(RulesVisitor)
    }
}

/// Selection rules for one pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolEntry {
    /// Default candidate list
    #[serde(default)]
    pub domains: Vec<WeightedDomain>,
    /// Path-prefix overrides, first match wins
    #[serde(default, skip_serializing_if = "PathRules::is_empty")]
    pub path_based_domains: PathRules,
    /// Headers attached to every redirect from this pool
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_headers: CustomHeaders,
}

impl PoolEntry {
    /// Create an entry with the given default candidates
    #[must_use]
    pub fn new(domains: Vec<WeightedDomain>) -> Self {
        Self {
            domains,
            ..Default::default()
        }
    }

    /// Add a path-prefix override
    #[must_use]
    pub fn with_path_rule(mut self, prefix: impl Into<String>, domains: Vec<WeightedDomain>) -> Self {
        self.path_based_domains.push(PathRule::new(prefix, domains));
        self
    }

    /// Add a custom header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_headers.insert(name.into(), value.into());
        self
    }
}

/// Pool table keyed by pool identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolConfig {
    pools: HashMap<String, PoolEntry>,
}

impl PoolConfig {
    /// Create an empty pool table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a pool
    #[must_use]
    pub fn with_pool(mut self, pool_id: impl Into<String>, entry: PoolEntry) -> Self {
        self.pools.insert(pool_id.into(), entry);
        self
    }

    /// Look up a pool by identifier
    #[must_use]
    pub fn get(&self, pool_id: &str) -> Option<&PoolEntry> {
        self.pools.get(pool_id)
    }

    /// Iterate all pools
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PoolEntry)> {
        self.pools.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    /// Sorted pool identifiers
    #[must_use]
    pub fn pool_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.pools.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of pools
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Whether no pool is configured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

impl FromIterator<(String, PoolEntry)> for PoolConfig {
    fn from_iter<I: IntoIterator<Item = (String, PoolEntry)>>(iter: I) -> Self {
        Self {
            pools: iter.into_iter().collect(),
        }
    }
}
