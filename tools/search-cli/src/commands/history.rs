//! Search history commands.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use turbo_search::filters::FlatFilters;
use turbo_search::history::SearchHistory;

use super::{HistoryArgs, HistoryCommand};
use crate::context::Context;
use crate::output::format_relative;

/// Run the history command.
pub async fn run(args: HistoryArgs, ctx: &Context) -> Result<()> {
    match args.command {
        Some(HistoryCommand::Clear) => clear(ctx),
        Some(HistoryCommand::List) | None => list(args.limit, ctx),
    }
}

fn list(limit: usize, ctx: &Context) -> Result<()> {
    let history = load(ctx)?;

    if ctx.output.is_json() {
        ctx.output.json(&history);
        return Ok(());
    }

    if history.is_empty() {
        ctx.output.info("No searches recorded yet.");
        return Ok(());
    }

    ctx.output.header("Recent searches");
    let widths = [30, 12, 8];
    ctx.output.table_row(&["QUERY", "WHEN", "FILTERS"], &widths);

    let now = current_timestamp();
    for entry in history.recent(limit) {
        ctx.output.table_row(
            &[
                &entry.query,
                &format_relative(now - entry.timestamp),
                &entry.filters.active_count().to_string(),
            ],
            &widths,
        );
    }

    ctx.output.info("");
    ctx.output
        .info(&format!("Total: {} search(es)", history.len()));

    Ok(())
}

fn clear(ctx: &Context) -> Result<()> {
    let path = history_path(ctx)?;
    if path.exists() {
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove history: {}", path.display()))?;
    }
    ctx.output.success("Search history cleared");
    Ok(())
}

/// Load the persisted history (empty when none exists).
pub(crate) fn load(ctx: &Context) -> Result<SearchHistory> {
    let path = history_path(ctx)?;
    if !path.exists() {
        return Ok(SearchHistory::with_cap(ctx.config.search.history_cap));
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read history: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse history: {}", path.display()))
}

/// Record a search and persist the updated history.
pub(crate) fn record(ctx: &Context, query: &str, filters: &FlatFilters) -> Result<()> {
    let mut history = load(ctx)?;
    history.add(query, filters.clone());

    let path = history_path(ctx)?;
    fs::write(&path, serde_json::to_string_pretty(&history)?)
        .with_context(|| format!("Failed to write history: {}", path.display()))
}

fn history_path(ctx: &Context) -> Result<PathBuf> {
    Ok(ctx.data_dir()?.join("history.json"))
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
