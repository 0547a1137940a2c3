//! Catalog search command.

use anyhow::{bail, Result};

use turbo_search::filters::{FilterSelection, FlatFilterKey, FlatFilters, SortOption};
use turbo_search::pagination::{Pagination, MAX_VISIBLE_PAGES};
use turbo_search::query::SearchQuery;
use turbo_search::results::SearchResult;
use turbo_search_engine::prelude::*;

use super::SearchArgs;
use crate::commands::{history, popular};
use crate::context::Context;
use crate::output::kind_badge;

/// Run the search command.
pub async fn run(args: SearchArgs, ctx: &Context) -> Result<()> {
    let backend =
        InMemoryBackend::new(ctx.load_products()?).with_extractor(ctx.facet_extractor(None));

    let query = build_query(&args, ctx)?;
    ctx.output
        .debug(&format!("canonical query: ?{}", query.to_query_string()));

    let result = backend.search(&query).await?;

    // Successful free-text searches feed history and popularity.
    if let Some(text) = query.q.as_deref() {
        if !result.is_empty() {
            history::record(ctx, text, &query.filters)?;
            popular::record(ctx, text)?;
        }
    }

    if ctx.output.is_json() {
        ctx.output.json(&result);
        return Ok(());
    }

    render(&result, ctx);
    Ok(())
}

fn build_query(args: &SearchArgs, ctx: &Context) -> Result<SearchQuery> {
    let mut filters = FlatFilters::default();
    if let Some(category) = &args.category {
        filters.set(FlatFilterKey::Category, category);
    }
    if let Some(brand) = &args.brand {
        filters.set(FlatFilterKey::Brand, brand);
    }
    if let Some(min) = args.min_price {
        filters.set(FlatFilterKey::MinPrice, &min.to_string());
    }
    if let Some(max) = args.max_price {
        filters.set(FlatFilterKey::MaxPrice, &max.to_string());
    }
    if let Some(rating) = args.rating {
        filters.set(FlatFilterKey::Rating, &rating.to_string());
    }
    if args.in_stock {
        filters.set(FlatFilterKey::InStock, "true");
    }
    if let Some(sort) = &args.sort {
        match SortOption::from_str(sort) {
            Some(sort) => filters.sort_by = sort,
            None => bail!(
                "Unknown sort '{}'. Valid: relevance, price_asc, price_desc, rating, newest, name",
                sort
            ),
        }
    }

    let mut selection = FilterSelection::new();
    for spec in &args.specs {
        let parsed = spec.split_once(':').and_then(|(category, rest)| {
            rest.split_once('=')
                .map(|(name, value)| (category.trim(), name.trim(), value.trim()))
        });
        match parsed {
            Some((category, name, value))
                if !category.is_empty() && !name.is_empty() && !value.is_empty() =>
            {
                selection.toggle(category, name, value, true);
            }
            _ => bail!("Invalid --spec '{}': expected 'Category:Name=Value'", spec),
        }
    }

    let mut query = SearchQuery::new()
        .with_filters(filters)
        .with_selection(selection)
        .with_pagination(args.page, args.limit.unwrap_or(ctx.config.search.limit));

    let text = args.query.as_deref().map(str::trim).unwrap_or("");
    if !text.is_empty() {
        query = query.with_text(text);
    }
    if args.facets || ctx.config.search.include_facets {
        query = query.with_facets();
    }

    Ok(query)
}

fn render(result: &SearchResult, ctx: &Context) {
    if result.is_empty() {
        ctx.output.info("No products found.");
        if !result.suggestions.is_empty() {
            ctx.output.header("Did you mean");
            for suggestion in &result.suggestions {
                ctx.output.list_item(&format!(
                    "{}  ({})",
                    suggestion.text,
                    kind_badge(suggestion.kind)
                ));
            }
        }
        return;
    }

    ctx.output.header(&format!(
        "Showing {} of {} product(s), page {} of {}",
        result.len(),
        result.pagination.total_products,
        result.pagination.current_page,
        result.pagination.total_pages
    ));

    let widths = [6, 32, 14, 10, 6, 5];
    ctx.output
        .table_row(&["ID", "TITLE", "BRAND", "PRICE", "RATING", "STOCK"], &widths);
    for product in &result.products {
        ctx.output.table_row(
            &[
                &product.id.to_string(),
                &truncate(&product.title, 32),
                &truncate(&product.brand, 14),
                &format!("{:.2}", product.price),
                &format!("{:.1}", product.rating),
                &product.stock.to_string(),
            ],
            &widths,
        );
    }

    if !result.facets.is_empty() {
        ctx.output.header("Facets");
        for facet in &result.facets {
            ctx.output.info(&format!("{}:", facet.category_name));
            for (name, values) in &facet.specs {
                ctx.output.kv(name, &values.join(", "));
            }
        }
    }

    if result.pagination.is_needed() {
        ctx.output.info("");
        ctx.output
            .info(&format!("Pages: {}", render_pager(&result.pagination)));
    }

    ctx.output
        .debug(&format!("query took {}ms", result.query_time_ms));
}

/// Render the visible page window, with first/last shortcuts when the
/// window does not touch the edges.
fn render_pager(pagination: &Pagination) -> String {
    let window = pagination.window(MAX_VISIBLE_PAGES);
    let mut parts: Vec<String> = Vec::new();

    if window.show_leading {
        parts.push("1".to_string());
        parts.push("…".to_string());
    }
    for page in &window.pages {
        if *page == pagination.current_page {
            parts.push(format!("[{}]", page));
        } else {
            parts.push(page.to_string());
        }
    }
    if window.show_trailing {
        parts.push("…".to_string());
        parts.push(pagination.total_pages.to_string());
    }

    parts.join(" ")
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
