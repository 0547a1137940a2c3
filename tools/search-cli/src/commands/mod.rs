//! CLI command implementations.

pub mod facets;
pub mod history;
pub mod popular;
pub mod search;
pub mod suggest;

use clap::{Args, Subcommand};

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Free-text query.
    pub query: Option<String>,

    /// Filter by category.
    #[arg(long)]
    pub category: Option<String>,

    /// Filter by brand.
    #[arg(long)]
    pub brand: Option<String>,

    /// Minimum price.
    #[arg(long)]
    pub min_price: Option<f64>,

    /// Maximum price.
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Minimum rating (0-5).
    #[arg(long)]
    pub rating: Option<f64>,

    /// Only in-stock products.
    #[arg(long)]
    pub in_stock: bool,

    /// Sort order (relevance, price_asc, price_desc, rating, newest, name).
    #[arg(short, long)]
    pub sort: Option<String>,

    /// Specification filter as 'Category:Name=Value' (repeatable).
    #[arg(long = "spec")]
    pub specs: Vec<String>,

    /// Page number.
    #[arg(short, long, default_value = "1")]
    pub page: i64,

    /// Products per page.
    #[arg(short, long)]
    pub limit: Option<i64>,

    /// Include facets in the result.
    #[arg(long)]
    pub facets: bool,
}

/// Arguments for the facets command.
#[derive(Args)]
pub struct FacetsArgs {
    /// Narrow to one product category before extraction.
    #[arg(long)]
    pub category: Option<String>,

    /// Override the per-category spec-name cap.
    #[arg(long)]
    pub cap: Option<usize>,
}

/// Arguments for the suggest command.
#[derive(Args)]
pub struct SuggestArgs {
    /// Partial query text.
    pub text: String,

    /// Maximum suggestions to show.
    #[arg(short, long, default_value = "10")]
    pub limit: usize,
}

/// Arguments for the popular command.
#[derive(Args)]
pub struct PopularArgs {
    /// Maximum queries to show.
    #[arg(short, long, default_value = "10")]
    pub limit: usize,
}

/// Arguments for the history command.
#[derive(Args)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: Option<HistoryCommand>,

    /// Maximum entries to show.
    #[arg(short, long, default_value = "10")]
    pub limit: usize,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List recent searches.
    List,
    /// Clear the search history.
    Clear,
}
