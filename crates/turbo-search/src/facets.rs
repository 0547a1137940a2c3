//! Facet extraction from catalog products.
//!
//! Walks every product's normalized specifications once and groups the
//! observed values as category → spec name → sorted distinct values.
//! Ordered maps keep the output stable for a fixed product set no matter
//! how the input is ordered, so recomputing facets never reshuffles the
//! filter panel.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::Product;

/// Spec names retained per category when no allow-list is configured.
pub const DEFAULT_SPEC_CAP: usize = 5;

/// One category of facetable specifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCategory {
    /// Category name (e.g., "Performance").
    #[serde(rename = "categoryName")]
    pub category_name: String,
    /// Spec name → lexicographically sorted distinct values.
    pub specs: BTreeMap<String, Vec<String>>,
}

impl FacetCategory {
    /// Values observed for a spec name, if any.
    pub fn values(&self, spec_name: &str) -> Option<&[String]> {
        self.specs.get(spec_name).map(Vec::as_slice)
    }
}

/// Per-category allow-lists of "important" spec names.
///
/// A category with an allow-list keeps exactly the listed names; a category
/// without one falls back to the extractor's spec cap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacetScope(BTreeMap<String, Vec<String>>);

impl FacetScope {
    /// Create an empty scope (every category falls back to the cap).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the allow-list for a category.
    pub fn allow(
        mut self,
        category: impl Into<String>,
        spec_names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.0.insert(
            category.into(),
            spec_names.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Allow-list for a category, if configured.
    pub fn allowed(&self, category: &str) -> Option<&[String]> {
        self.0.get(category).map(Vec::as_slice)
    }

    /// Whether no category has an allow-list.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Facet extractor over a product collection.
#[derive(Debug, Clone, Default)]
pub struct FacetExtractor {
    scope: FacetScope,
    spec_cap: usize,
}

impl FacetExtractor {
    /// Create an extractor with the default spec cap and no scope.
    pub fn new() -> Self {
        Self {
            scope: FacetScope::new(),
            spec_cap: DEFAULT_SPEC_CAP,
        }
    }

    /// Restrict categories to their allow-listed spec names.
    pub fn with_scope(mut self, scope: FacetScope) -> Self {
        self.scope = scope;
        self
    }

    /// Override the fallback cap on spec names per category.
    pub fn with_spec_cap(mut self, cap: usize) -> Self {
        self.spec_cap = cap;
        self
    }

    /// Extract facets from a product collection.
    ///
    /// Single pass over every product's specifications; malformed entries
    /// were already dropped by normalization. Identical product content
    /// yields identical output regardless of slice order.
    pub fn extract(&self, products: &[Product]) -> Vec<FacetCategory> {
        let mut grouped: BTreeMap<String, BTreeMap<String, BTreeSet<String>>> = BTreeMap::new();

        for product in products {
            for spec in product.normalized_specs() {
                grouped
                    .entry(spec.category)
                    .or_default()
                    .entry(spec.name)
                    .or_default()
                    .insert(spec.value);
            }
        }

        grouped
            .into_iter()
            .map(|(category_name, specs)| {
                let specs = self.retain_specs(&category_name, specs);
                FacetCategory {
                    category_name,
                    specs,
                }
            })
            .filter(|facet| !facet.specs.is_empty())
            .collect()
    }

    /// Apply the allow-list or the cap to one category's spec names.
    fn retain_specs(
        &self,
        category: &str,
        specs: BTreeMap<String, BTreeSet<String>>,
    ) -> BTreeMap<String, Vec<String>> {
        let sorted = |values: BTreeSet<String>| values.into_iter().collect::<Vec<_>>();

        match self.scope.allowed(category) {
            Some(allowed) => specs
                .into_iter()
                .filter(|(name, _)| allowed.iter().any(|a| a == name))
                .map(|(name, values)| (name, sorted(values)))
                .collect(),
            None => specs
                .into_iter()
                .take(self.spec_cap)
                .map(|(name, values)| (name, sorted(values)))
                .collect(),
        }
    }
}

/// Extract facets with the default extractor.
pub fn extract_facets(products: &[Product]) -> Vec<FacetCategory> {
    FacetExtractor::new().extract(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::Specification;

    fn laptop_catalog() -> Vec<Product> {
        vec![
            Product::new(1u64)
                .with_spec(Specification::new("RAM", "8GB", Some("Performance")))
                .with_spec(Specification::new("CPU", "i5", Some("Performance")))
                .with_spec(Specification::new("Panel", "IPS", Some("Display"))),
            Product::new(2u64)
                .with_spec(Specification::new("RAM", "16GB", Some("Performance")))
                .with_spec(Specification::new("RAM", "8GB", Some("Performance")))
                .with_spec(Specification::new("Panel", "OLED", Some("Display"))),
        ]
    }

    #[test]
    fn test_groups_by_category_and_name_with_sorted_values() {
        let facets = extract_facets(&laptop_catalog());

        assert_eq!(facets.len(), 2);
        assert_eq!(facets[0].category_name, "Display");
        assert_eq!(facets[1].category_name, "Performance");
        assert_eq!(
            facets[1].values("RAM").unwrap(),
            &["16GB".to_string(), "8GB".to_string()]
        );
    }

    #[test]
    fn test_values_are_deduplicated() {
        let facets = extract_facets(&laptop_catalog());
        assert_eq!(facets[1].values("RAM").unwrap().len(), 2);
    }

    #[test]
    fn test_deterministic_across_input_order() {
        let catalog = laptop_catalog();
        let mut reversed = catalog.clone();
        reversed.reverse();

        let a = serde_json::to_string(&extract_facets(&catalog)).unwrap();
        let b = serde_json::to_string(&extract_facets(&reversed)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let catalog = laptop_catalog();
        assert_eq!(extract_facets(&catalog), extract_facets(&catalog));
    }

    #[test]
    fn test_spec_cap_keeps_first_names_lexicographically() {
        let mut product = Product::new(1u64);
        for name in ["Zoom", "Aperture", "Burst", "Codec", "Dynamic", "Exposure", "Focus"] {
            product = product.with_spec(Specification::new(name, "yes", Some("Camera")));
        }

        let facets = extract_facets(&[product]);
        let names: Vec<&String> = facets[0].specs.keys().collect();
        assert_eq!(names, ["Aperture", "Burst", "Codec", "Dynamic", "Exposure"]);
    }

    #[test]
    fn test_allow_list_overrides_cap() {
        let mut product = Product::new(1u64);
        for name in ["Aperture", "Burst", "Codec", "Dynamic", "Exposure", "Focus", "Zoom"] {
            product = product.with_spec(Specification::new(name, "yes", Some("Camera")));
        }

        let scope = FacetScope::new().allow("Camera", ["Zoom", "Focus"]);
        let facets = FacetExtractor::new().with_scope(scope).extract(&[product]);

        let names: Vec<&String> = facets[0].specs.keys().collect();
        assert_eq!(names, ["Focus", "Zoom"]);
    }

    #[test]
    fn test_allow_list_applies_per_category() {
        let products = vec![
            Product::new(1u64)
                .with_spec(Specification::new("RAM", "8GB", Some("Performance")))
                .with_spec(Specification::new("Panel", "IPS", Some("Display"))),
        ];

        let scope = FacetScope::new().allow("Performance", ["RAM"]);
        let facets = FacetExtractor::new().with_scope(scope).extract(&products);

        // Display has no allow-list and falls back to the cap.
        assert_eq!(facets.len(), 2);
        assert!(facets[0].values("Panel").is_some());
        assert!(facets[1].values("RAM").is_some());
    }

    #[test]
    fn test_malformed_specs_never_break_extraction() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "id": 9,
            "specifications": [null, 12, {"name": "RAM", "value": "4GB"}, "oops"]
        }))
        .unwrap();

        let facets = extract_facets(&[product]);
        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0].category_name, "Other");
        assert_eq!(facets[0].values("RAM").unwrap(), &["4GB".to_string()]);
    }

    #[test]
    fn test_empty_catalog_yields_no_facets() {
        assert!(extract_facets(&[]).is_empty());
    }
}
