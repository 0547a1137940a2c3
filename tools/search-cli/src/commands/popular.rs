//! Popular query command.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::PopularArgs;
use crate::context::Context;

/// Run the popular command.
pub async fn run(args: PopularArgs, ctx: &Context) -> Result<()> {
    let counts = load(ctx)?;

    // Count descending, ties alphabetical.
    let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(args.limit);

    if ctx.output.is_json() {
        let shaped: Vec<_> = ranked
            .iter()
            .map(|(query, count)| serde_json::json!({"query": query, "count": count}))
            .collect();
        ctx.output.json(&shaped);
        return Ok(());
    }

    if ranked.is_empty() {
        ctx.output.info("No searches recorded yet.");
        return Ok(());
    }

    ctx.output.header("Popular searches");
    ctx.output.table_row(&["QUERY", "SEARCHES"], &[30, 8]);
    for (query, count) in &ranked {
        ctx.output
            .table_row(&[query, &count.to_string()], &[30, 8]);
    }

    Ok(())
}

/// Load the persisted popularity counts (empty when none exist).
pub(crate) fn load(ctx: &Context) -> Result<BTreeMap<String, u64>> {
    let path = popularity_path(ctx)?;
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read popularity data: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse popularity data: {}", path.display()))
}

/// Count one more run of a query.
pub(crate) fn record(ctx: &Context, query: &str) -> Result<()> {
    let mut counts = load(ctx)?;
    *counts.entry(query.to_string()).or_insert(0) += 1;

    let path = popularity_path(ctx)?;
    fs::write(&path, serde_json::to_string_pretty(&counts)?)
        .with_context(|| format!("Failed to write popularity data: {}", path.display()))
}

fn popularity_path(ctx: &Context) -> Result<PathBuf> {
    Ok(ctx.data_dir()?.join("popular.json"))
}
