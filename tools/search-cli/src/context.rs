//! CLI execution context.

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};

use turbo_search::catalog::Product;
use turbo_search::facets::FacetExtractor;

use crate::config::CliConfig;
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Catalog path override from the command line.
    catalog_override: Option<String>,
}

impl Context {
    /// Load context from config file.
    pub fn load(
        config_path: Option<&str>,
        catalog_override: Option<String>,
        output: Output,
    ) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            CliConfig::load(path)?
        } else {
            // Try to find config in current directory or parent directories
            Self::find_config(&cwd).unwrap_or_default()
        };

        Ok(Self {
            config,
            output,
            cwd,
            catalog_override,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &PathBuf) -> Option<CliConfig> {
        let config_names = ["tsearch.toml", ".tsearch.toml", "tsearch.json"];

        let mut current = start.clone();
        loop {
            for name in &config_names {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some(config);
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Load the product catalog (flag > config).
    pub fn load_products(&self) -> Result<Vec<Product>> {
        let path = self
            .catalog_override
            .as_deref()
            .or(self.config.catalog.path.as_deref());
        let Some(path) = path else {
            bail!("No catalog configured. Pass --catalog or set [catalog] path in tsearch.toml");
        };

        let resolved = self.resolve_path(path);
        let content = std::fs::read_to_string(&resolved)
            .with_context(|| format!("Failed to read catalog: {}", resolved.display()))?;
        let products: Vec<Product> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog: {}", resolved.display()))?;

        self.output
            .debug(&format!("loaded {} products from {}", products.len(), resolved.display()));
        Ok(products)
    }

    /// Facet extractor configured from the config file, with an optional
    /// cap override from the command line.
    pub fn facet_extractor(&self, cap_override: Option<usize>) -> FacetExtractor {
        FacetExtractor::new()
            .with_scope(self.config.facets.scope.clone())
            .with_spec_cap(cap_override.unwrap_or(self.config.facets.spec_cap))
    }

    /// Get the local data directory.
    pub fn data_dir(&self) -> Result<PathBuf> {
        let dir = self.cwd.join(".tsearch");
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}
