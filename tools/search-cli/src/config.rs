//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use turbo_search::facets::{FacetScope, DEFAULT_SPEC_CAP};
use turbo_search::history::HISTORY_CAP;
use turbo_search::query::DEFAULT_LIMIT;

/// CLI configuration file.
///
/// Command-line flags override these values, which override the built-in
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Catalog source.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Search defaults.
    #[serde(default)]
    pub search: SearchConfig,

    /// Facet extraction settings.
    #[serde(default)]
    pub facets: FacetsConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

/// Catalog source settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to a JSON array of products.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Search defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Products per page.
    #[serde(default = "default_limit")]
    pub limit: i64,

    /// Request facets with every search.
    #[serde(default)]
    pub include_facets: bool,

    /// Entries kept in the local search history.
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

fn default_history_cap() -> usize {
    HISTORY_CAP
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            include_facets: false,
            history_cap: default_history_cap(),
        }
    }
}

/// Facet extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetsConfig {
    /// Most spec names kept per category without an allow-list.
    #[serde(default = "default_spec_cap")]
    pub spec_cap: usize,

    /// Per-category allow-lists of spec names, e.g.
    /// `Performance = ["RAM", "Storage"]`.
    #[serde(default)]
    pub scope: FacetScope,
}

fn default_spec_cap() -> usize {
    DEFAULT_SPEC_CAP
}

impl Default for FacetsConfig {
    fn default() -> Self {
        Self {
            spec_cap: default_spec_cap(),
            scope: FacetScope::new(),
        }
    }
}
