//! Process-wide configuration.
//!
//! Read once at startup from the environment and immutable thereafter.
//! The credential is the only required value; everything else has a
//! default suitable for unrestricted search within conservative caps.

use crate::error::ConfigError;

const DEFAULT_API_URL: &str = "https://api.gridbase.dev";
const DEFAULT_WEB_URL: &str = "https://app.gridbase.dev";
const DEFAULT_MAX_SEARCH_RESULTS: usize = 100;
const DEFAULT_MAX_PER_TABLE: usize = 10;

/// Field names tried first when assembling a search snippet. A prioritized
/// hint list, not a guarantee of presence.
const DEFAULT_PRIORITY_FIELDS: &[&str] = &[
    "name", "address", "notes", "company", "client", "owner", "status",
];

/// Immutable service configuration shared by the client and the MCP layer.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Bearer credential for the record store. Required.
    pub api_key: String,
    /// Record store API endpoint.
    pub api_url: String,
    /// Web endpoint used to build record links in search results.
    pub web_url: String,
    /// Base ids eligible for generic search. Empty means every base.
    pub allowed_bases: Vec<String>,
    /// Cap on total results per search call.
    pub max_search_results: usize,
    /// Cap on results contributed by a single table.
    pub max_per_table: usize,
    /// Field names preferred when assembling snippets.
    pub priority_fields: Vec<String>,
}

impl ServiceConfig {
    /// Read configuration from the process environment.
    ///
    /// A missing `GRIDBASE_API_KEY` is fatal: the service must not become
    /// ready without a credential.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup. The seam
    /// used by `from_env` and by tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("GRIDBASE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let api_url = lookup("GRIDBASE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let web_url = lookup("GRIDBASE_WEB_URL").unwrap_or_else(|| DEFAULT_WEB_URL.to_string());

        let allowed_bases = lookup("GRIDBASE_SEARCH_BASES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let max_search_results = parse_limit(
            "GRIDBASE_SEARCH_MAX_RESULTS",
            lookup("GRIDBASE_SEARCH_MAX_RESULTS"),
            DEFAULT_MAX_SEARCH_RESULTS,
        )?;
        let max_per_table = parse_limit(
            "GRIDBASE_SEARCH_PER_TABLE",
            lookup("GRIDBASE_SEARCH_PER_TABLE"),
            DEFAULT_MAX_PER_TABLE,
        )?;

        Ok(Self {
            api_key,
            api_url,
            web_url,
            allowed_bases,
            max_search_results,
            max_per_table,
            priority_fields: DEFAULT_PRIORITY_FIELDS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Whether a base is eligible for generic search.
    pub fn base_allowed(&self, base_id: &str) -> bool {
        self.allowed_bases.is_empty() || self.allowed_bases.iter().any(|id| id == base_id)
    }
}

fn parse_limit(var: &str, raw: Option<String>, default: usize) -> Result<usize, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidLimit {
            var: var.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let result = ServiceConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn blank_api_key_is_fatal() {
        let result = ServiceConfig::from_lookup(lookup_from(&[("GRIDBASE_API_KEY", "  ")]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config =
            ServiceConfig::from_lookup(lookup_from(&[("GRIDBASE_API_KEY", "key-1")])).unwrap();
        assert_eq!(config.max_search_results, 100);
        assert_eq!(config.max_per_table, 10);
        assert!(config.allowed_bases.is_empty());
        assert!(config.base_allowed("any-base"));
    }

    #[test]
    fn allow_list_is_parsed_and_enforced() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("GRIDBASE_API_KEY", "key-1"),
            ("GRIDBASE_SEARCH_BASES", "app1, app2 ,"),
        ]))
        .unwrap();
        assert_eq!(config.allowed_bases, vec!["app1", "app2"]);
        assert!(config.base_allowed("app1"));
        assert!(!config.base_allowed("app3"));
    }

    #[test]
    fn invalid_limit_is_rejected() {
        let result = ServiceConfig::from_lookup(lookup_from(&[
            ("GRIDBASE_API_KEY", "key-1"),
            ("GRIDBASE_SEARCH_MAX_RESULTS", "lots"),
        ]));
        assert!(matches!(result, Err(ConfigError::InvalidLimit { .. })));
    }

    #[test]
    fn limits_can_be_overridden() {
        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("GRIDBASE_API_KEY", "key-1"),
            ("GRIDBASE_SEARCH_MAX_RESULTS", "25"),
            ("GRIDBASE_SEARCH_PER_TABLE", "5"),
        ]))
        .unwrap();
        assert_eq!(config.max_search_results, 25);
        assert_eq!(config.max_per_table, 5);
    }
}
