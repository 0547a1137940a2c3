//! Autocomplete command.

use anyhow::Result;

use turbo_search_engine::prelude::*;

use super::SuggestArgs;
use crate::context::Context;
use crate::output::kind_badge;

/// Minimum characters before autocomplete runs.
const MIN_QUERY_LEN: usize = 2;

/// Run the suggest command.
pub async fn run(args: SuggestArgs, ctx: &Context) -> Result<()> {
    if args.text.trim().chars().count() < MIN_QUERY_LEN {
        ctx.output.info("Type at least two characters.");
        return Ok(());
    }

    let backend = InMemoryBackend::new(ctx.load_products()?);
    let mut suggestions = backend.autocomplete(&args.text).await?;
    suggestions.truncate(args.limit);

    if ctx.output.is_json() {
        ctx.output.json(&suggestions);
        return Ok(());
    }

    if suggestions.is_empty() {
        ctx.output
            .info(&format!("No suggestions for '{}'", args.text));
        return Ok(());
    }

    ctx.output
        .header(&format!("Suggestions for '{}'", args.text));
    for suggestion in &suggestions {
        ctx.output.list_item(&format!(
            "{}  ({})",
            suggestion.text,
            kind_badge(suggestion.kind)
        ));
    }

    Ok(())
}
