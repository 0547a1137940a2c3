//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Tunables for the search engine.
///
/// The defaults match the shipped search experience; tests and demos
/// override individual fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Quiet period before an autocomplete request is issued, in ms.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Minimum query length (in characters) for autocomplete.
    #[serde(default = "default_min_autocomplete_len")]
    pub min_autocomplete_len: usize,
    /// Page numbers shown at once in the pagination control.
    #[serde(default = "default_max_visible_pages")]
    pub max_visible_pages: usize,
    /// Recent searches kept before the oldest is evicted.
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    /// Page size for dispatched queries.
    #[serde(default = "default_limit")]
    pub default_limit: i64,
    /// Whether dispatched queries request facets.
    #[serde(default = "default_include_facets")]
    pub include_facets: bool,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_autocomplete_len() -> usize {
    2
}

fn default_max_visible_pages() -> usize {
    turbo_search::pagination::MAX_VISIBLE_PAGES
}

fn default_history_cap() -> usize {
    turbo_search::history::HISTORY_CAP
}

fn default_limit() -> i64 {
    turbo_search::query::DEFAULT_LIMIT
}

fn default_include_facets() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_autocomplete_len: default_min_autocomplete_len(),
            max_visible_pages: default_max_visible_pages(),
            history_cap: default_history_cap(),
            default_limit: default_limit(),
            include_facets: default_include_facets(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.min_autocomplete_len, 2);
        assert_eq!(config.max_visible_pages, 5);
        assert_eq!(config.history_cap, 10);
        assert_eq!(config.default_limit, 20);
        assert!(config.include_facets);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"debounce_ms": 150}"#).unwrap();
        assert_eq!(config.debounce_ms, 150);
        assert_eq!(config.history_cap, 10);
    }
}
