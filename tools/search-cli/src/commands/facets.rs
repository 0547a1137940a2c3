//! Facet tree command.

use anyhow::Result;

use super::FacetsArgs;
use crate::context::Context;

/// Run the facets command.
pub async fn run(args: FacetsArgs, ctx: &Context) -> Result<()> {
    let mut products = ctx.load_products()?;
    if let Some(category) = &args.category {
        products.retain(|p| p.category.eq_ignore_ascii_case(category));
    }

    let facets = ctx.facet_extractor(args.cap).extract(&products);

    if ctx.output.is_json() {
        ctx.output.json(&facets);
        return Ok(());
    }

    if facets.is_empty() {
        ctx.output.info("No specifications found.");
        return Ok(());
    }

    for facet in &facets {
        ctx.output.header(&facet.category_name);
        for (name, values) in &facet.specs {
            ctx.output.kv(name, &values.join(", "));
        }
    }

    ctx.output.info("");
    ctx.output.info(&format!(
        "{} facet categor{} from {} product(s)",
        facets.len(),
        if facets.len() == 1 { "y" } else { "ies" },
        products.len()
    ));

    Ok(())
}
