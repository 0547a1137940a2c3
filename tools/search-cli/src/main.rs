//! TurboSearch CLI - Command line search console for product catalogs.
//!
//! Commands:
//! - `tsearch search` - Search the catalog with filters and facets
//! - `tsearch facets` - Show the facet tree extracted from the catalog
//! - `tsearch suggest` - Autocomplete a partial query
//! - `tsearch popular` - Show the most frequently run queries
//! - `tsearch history` - Show or clear recent searches

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{FacetsArgs, HistoryArgs, PopularArgs, SearchArgs, SuggestArgs};

/// TurboSearch CLI - Search and explore product catalogs
#[derive(Parser)]
#[command(name = "tsearch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Catalog file path (JSON array of products)
    #[arg(long, global = true)]
    catalog: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog
    Search(SearchArgs),

    /// Show the facet tree for the catalog
    Facets(FacetsArgs),

    /// Autocomplete a partial query
    Suggest(SuggestArgs),

    /// Show the most frequently run queries
    Popular(PopularArgs),

    /// Show or clear recent searches
    History(HistoryArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let ctx = context::Context::load(cli.config.as_deref(), cli.catalog, output)?;

    // Execute command
    let result = match cli.command {
        Commands::Search(args) => commands::search::run(args, &ctx).await,
        Commands::Facets(args) => commands::facets::run(args, &ctx).await,
        Commands::Suggest(args) => commands::suggest::run(args, &ctx).await,
        Commands::Popular(args) => commands::popular::run(args, &ctx).await,
        Commands::History(args) => commands::history::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
