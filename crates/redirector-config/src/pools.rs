//! Pool table loading and validation.

use http::{HeaderName, HeaderValue};
use redirector_core::{PoolConfig, PoolEntry, WeightedDomain};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{ConfigError, Result};
use crate::format::ConfigFormat;

/// Read, parse and validate the pool table at `path`.
///
/// The format follows the file extension (see [`ConfigFormat::from_path`]).
pub async fn load_pools(path: impl AsRef<Path>) -> Result<PoolConfig> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let pools = parse_pools(&text, ConfigFormat::from_path(path))?;

    info!(
        path = %path.display(),
        pools = pools.len(),
        "Pool configuration loaded"
    );

    Ok(pools)
}

/// Parse and validate a pool table document.
pub fn parse_pools(text: &str, format: ConfigFormat) -> Result<PoolConfig> {
    let pools: PoolConfig = format.decode(text)?;
    validate_pools(&pools)?;
    Ok(pools)
}

/// Validate a pool table.
///
/// Rejects empty pool identifiers, empty or malformed domain names, negative or
/// non-finite weights and header names or values that cannot be sent over
/// HTTP. A pool whose candidates are empty or all zero-weight is accepted
/// with a warning; resolving against it reports no available domains.
pub fn validate_pools(pools: &PoolConfig) -> Result<()> {
    for (pool_id, entry) in pools.iter() {
        if pool_id.trim().is_empty() {
            return Err(ConfigError::invalid("pool identifier must not be empty"));
        }
        validate_entry(pool_id, entry)?;
    }
    Ok(())
}

fn validate_entry(pool_id: &str, entry: &PoolEntry) -> Result<()> {
    validate_candidates(pool_id, "domains", &entry.domains)?;

    let mut seen: Vec<&str> = Vec::with_capacity(entry.path_based_domains.len());
    for rule in &entry.path_based_domains {
        let section = format!("path_based_domains[{:?}]", rule.prefix);
        validate_candidates(pool_id, &section, &rule.domains)?;

        if let Some(earlier) = seen.iter().find(|p| rule.prefix.starts_with(**p)) {
            warn!(
                pool_id = %pool_id,
                prefix = %rule.prefix,
                shadowed_by = %earlier,
                "Path rule can never match; an earlier prefix covers it"
            );
        }
        seen.push(&rule.prefix);
    }

    for (name, value) in &entry.custom_headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            ConfigError::invalid(format!("pool {pool_id:?}: invalid header name {name:?}"))
        })?;
        HeaderValue::from_str(value).map_err(|_| {
            ConfigError::invalid(format!(
                "pool {pool_id:?}: invalid value for header {name:?}"
            ))
        })?;
    }

    Ok(())
}

fn validate_candidates(pool_id: &str, section: &str, candidates: &[WeightedDomain]) -> Result<()> {
    for candidate in candidates {
        if !is_valid_domain(&candidate.domain) {
            return Err(ConfigError::invalid(format!(
                "pool {pool_id:?} {section}: invalid domain {:?}",
                candidate.domain
            )));
        }
        if !candidate.weight.is_finite() || candidate.weight < 0.0 {
            return Err(ConfigError::invalid(format!(
                "pool {pool_id:?} {section}: weight of {:?} must be a non-negative number, got {}",
                candidate.domain, candidate.weight
            )));
        }
    }

    if !candidates.iter().any(WeightedDomain::is_selectable) {
        warn!(
            pool_id = %pool_id,
            section = %section,
            "No selectable domain; requests routed here will fail"
        );
    }

    Ok(())
}

/// Host names become the authority of the target URL.
fn is_valid_domain(domain: &str) -> bool {
    !domain.is_empty()
        && !domain
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#' | '@'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const POOLS_JSON: &str = r#"{
        "pool1": {
            "domains": [["domain-a.xyz", 2], ["domain-b.xyz", 1]],
            "path_based_domains": {
                "news/": [["domain-c.xyz", 2], ["domain-d.xyz", 1]],
                "contact/": [["domain-e.xyz", 2], ["domain-f.xyz", 1]]
            },
            "custom_headers": {"X-Custom-Header": "Value"}
        },
        "pool2": {"domains": [["domain-g.xyz", 2], ["domain-h.xyz", 1]]}
    }"#;

    #[test]
    fn test_parse_json() {
        let pools = parse_pools(POOLS_JSON, ConfigFormat::Json).unwrap();
        assert_eq!(pools.pool_ids(), vec!["pool1", "pool2"]);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
pool1:
  domains: [["a.example", 3], ["b.example", 1]]
  path_based_domains:
    "news/": [["c.example", 1]]
  custom_headers:
    X-Pool: one
"#;
        let pools = parse_pools(yaml, ConfigFormat::Yaml).unwrap();
        let entry = pools.get("pool1").unwrap();
        assert_eq!(entry.domains.len(), 2);
        assert_eq!(entry.path_based_domains.len(), 1);
        assert_eq!(entry.custom_headers["X-Pool"], "one");
    }

    #[test]
    fn test_parse_toml_keeps_rule_order() {
        let text = r#"
[pool1]
domains = [["a.example", 2], ["b.example", 1]]

[pool1.path_based_domains]
"zeta/" = [["z.example", 1]]
"alpha/" = [["a.example", 1]]

[pool1.custom_headers]
X-Pool = "one"
"#;
        let pools = parse_pools(text, ConfigFormat::Toml).unwrap();
        let prefixes: Vec<&str> = pools
            .get("pool1")
            .unwrap()
            .path_based_domains
            .iter()
            .map(|r| r.prefix.as_str())
            .collect();
        assert_eq!(prefixes, vec!["zeta/", "alpha/"]);
    }

    #[test]
    fn test_empty_document() {
        let pools = parse_pools("{}", ConfigFormat::Json).unwrap();
        assert!(pools.is_empty());
    }

    #[test]
    fn test_rejects_negative_weight() {
        let err = parse_pools(r#"{"p": {"domains": [["a.com", -1]]}}"#, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("non-negative"));
    }

    #[test]
    fn test_rejects_negative_weight_in_path_rule() {
        let doc = r#"{"p": {"domains": [["a.com", 1]], "path_based_domains": {"x/": [["b.com", -2]]}}}"#;
        let err = parse_pools(doc, ConfigFormat::Json).unwrap_err();
        assert!(err.to_string().contains("path_based_domains"));
    }

    #[test]
    fn test_rejects_malformed_pair() {
        let err = parse_pools(r#"{"p": {"domains": [["a.com"]]}}"#, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = parse_pools(r#"{"p": {"domains": [[1, "a.com"]]}}"#, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_rejects_bad_domain() {
        for domain in ["", "a.com/evil", "a b.com", "user@a.com"] {
            let doc = format!(r#"{{"p": {{"domains": [["{domain}", 1]]}}}}"#);
            assert!(parse_pools(&doc, ConfigFormat::Json).is_err(), "{domain:?}");
        }
    }

    #[test]
    fn test_accepts_host_with_port() {
        assert!(parse_pools(r#"{"p": {"domains": [["a.com:8443", 1]]}}"#, ConfigFormat::Json).is_ok());
    }

    #[test]
    fn test_rejects_bad_headers() {
        let doc = r#"{"p": {"domains": [["a.com", 1]], "custom_headers": {"Bad Header": "v"}}}"#;
        assert!(parse_pools(doc, ConfigFormat::Json).is_err());

        let doc = r#"{"p": {"domains": [["a.com", 1]], "custom_headers": {"X-Ok": "line\nbreak"}}}"#;
        assert!(parse_pools(doc, ConfigFormat::Json).is_err());
    }

    #[test]
    fn test_rejects_empty_pool_id() {
        let err = parse_pools(r#"{"": {"domains": [["a.com", 1]]}}"#, ConfigFormat::Json).unwrap_err();
        assert!(err.to_string().contains("pool identifier"));
    }

    #[test]
    fn test_accepts_unselectable_pools() {
        let doc = r#"{"empty": {"domains": []}, "zero": {"domains": [["a.com", 0]]}}"#;
        let pools = parse_pools(doc, ConfigFormat::Json).unwrap();
        assert_eq!(pools.len(), 2);
    }

    #[tokio::test]
    async fn test_load_pools_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(POOLS_JSON.as_bytes()).unwrap();

        let pools = load_pools(file.path()).await.unwrap();
        assert_eq!(pools.len(), 2);
    }

    #[tokio::test]
    async fn test_load_pools_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        file.write_all(b"p:\n  domains: [[a.com, 1]]\n").unwrap();

        let pools = load_pools(file.path()).await.unwrap();
        assert!(pools.get("p").is_some());
    }

    #[tokio::test]
    async fn test_load_pools_missing_file() {
        let err = load_pools("/nonexistent/pools.json").await.unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
