//! In-memory search backend (for development/testing).
//!
//! Serves a catalog snapshot loaded at construction. Matching is plain
//! case-insensitive substring search; relevance keeps catalog order. Facets
//! are computed from the products matched by text and flat filters, before
//! the nested selection narrows them, so checking a value does not collapse
//! its own facet group.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use async_trait::async_trait;
use parking_lot::RwLock;

use turbo_search::catalog::Product;
use turbo_search::facets::FacetExtractor;
use turbo_search::filters::{FlatFilters, SortOption};
use turbo_search::history::{SearchHistory, SearchHistoryEntry};
use turbo_search::pagination::Pagination;
use turbo_search::query::SearchQuery;
use turbo_search::results::{
    FilterOptions, PriceRange, SearchResult, Suggestion, SuggestionKind,
};

use crate::backend::{BackendResult, SearchBackend};

/// Most suggestions returned by autocomplete.
const AUTOCOMPLETE_LIMIT: usize = 10;

/// Most "did you mean" suggestions attached to an empty result.
const DID_YOU_MEAN_LIMIT: usize = 5;

/// A catalog-snapshot backend.
pub struct InMemoryBackend {
    products: Vec<Product>,
    extractor: FacetExtractor,
    history: RwLock<SearchHistory>,
    popularity: RwLock<BTreeMap<String, u64>>,
}

impl InMemoryBackend {
    /// Create a backend over a product snapshot.
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            extractor: FacetExtractor::new(),
            history: RwLock::new(SearchHistory::new()),
            popularity: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load the snapshot from a JSON array of products.
    pub fn from_json(json: &str) -> BackendResult<Self> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Ok(Self::new(products))
    }

    /// Replace the facet extractor (scope or cap overrides).
    pub fn with_extractor(mut self, extractor: FacetExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Override the history cap.
    pub fn with_history_cap(self, cap: usize) -> Self {
        *self.history.write() = SearchHistory::with_cap(cap);
        self
    }

    /// Number of products in the snapshot.
    pub fn catalog_size(&self) -> usize {
        self.products.len()
    }

    fn matches_text(product: &Product, needle: Option<&str>) -> bool {
        let Some(needle) = needle else {
            return true;
        };
        if needle.is_empty() {
            return true;
        }
        product.title.to_lowercase().contains(needle)
            || product.description.to_lowercase().contains(needle)
            || product.brand.to_lowercase().contains(needle)
            || product.category.to_lowercase().contains(needle)
    }

    fn sort_products(products: &mut [&Product], sort: SortOption) {
        match sort {
            // Relevance keeps catalog order; no scorer in this backend.
            SortOption::Relevance => {}
            SortOption::PriceAsc => products.sort_by(|a, b| compare_f64(a.price, b.price)),
            SortOption::PriceDesc => products.sort_by(|a, b| compare_f64(b.price, a.price)),
            SortOption::Rating => products.sort_by(|a, b| compare_f64(b.rating, a.rating)),
            SortOption::Newest => products.sort_by(|a, b| b.id.cmp(&a.id)),
            SortOption::Name => {
                products.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
            }
        }
    }

    /// Candidates from the catalog that share the query's leading
    /// characters, for the "did you mean" affordance.
    fn derive_suggestions(&self, text: Option<&str>) -> Vec<Suggestion> {
        let Some(text) = text else {
            return Vec::new();
        };
        let prefix: String = text.trim().to_lowercase().chars().take(3).collect();
        if prefix.is_empty() {
            return Vec::new();
        }

        let mut suggestions = Vec::new();
        let mut seen = BTreeSet::new();
        for product in &self.products {
            for (candidate, kind) in [
                (&product.title, SuggestionKind::Product),
                (&product.brand, SuggestionKind::Brand),
                (&product.category, SuggestionKind::Category),
            ] {
                let lowered = candidate.to_lowercase();
                if lowered.starts_with(&prefix) && seen.insert(lowered) {
                    suggestions.push(Suggestion::new(candidate.clone(), kind));
                }
            }
        }
        suggestions.truncate(DID_YOU_MEAN_LIMIT);
        suggestions
    }
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    async fn search(&self, query: &SearchQuery) -> BackendResult<SearchResult> {
        let started = Instant::now();
        let needle = query.q.as_deref().map(str::to_lowercase);

        let facet_source: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| Self::matches_text(p, needle.as_deref()))
            .filter(|p| query.filters.matches(p))
            .collect();

        let mut matched: Vec<&Product> = facet_source
            .iter()
            .copied()
            .filter(|p| query.specs.matches(p))
            .collect();
        Self::sort_products(&mut matched, query.filters.sort_by);

        let total = matched.len() as i64;
        let pagination = Pagination::new(query.page, query.limit, total);

        let offset = query.offset().max(0) as usize;
        let products: Vec<Product> = matched
            .iter()
            .skip(offset)
            .take(query.limit.max(0) as usize)
            .map(|p| (*p).clone())
            .collect();

        let mut result = SearchResult::new(products, pagination);
        if query.include_facets {
            let source: Vec<Product> = facet_source.iter().map(|p| (*p).clone()).collect();
            result = result.with_facets(self.extractor.extract(&source));
        }
        if result.is_empty() {
            result = result.with_suggestions(self.derive_suggestions(query.q.as_deref()));
        }

        Ok(result.with_query_time(started.elapsed().as_millis() as i64))
    }

    async fn autocomplete(&self, text: &str) -> BackendResult<Vec<Suggestion>> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut suggestions = Vec::new();
        let mut seen = BTreeSet::new();

        for product in &self.products {
            let lowered = product.title.to_lowercase();
            if lowered.contains(&needle) && seen.insert(lowered) {
                suggestions.push(Suggestion::new(product.title.clone(), SuggestionKind::Product));
            }
        }

        let brands: BTreeSet<&String> = self.products.iter().map(|p| &p.brand).collect();
        for brand in brands {
            let lowered = brand.to_lowercase();
            if !brand.is_empty() && lowered.contains(&needle) && seen.insert(lowered) {
                suggestions.push(Suggestion::new(brand.clone(), SuggestionKind::Brand));
            }
        }

        let categories: BTreeSet<&String> = self.products.iter().map(|p| &p.category).collect();
        for category in categories {
            let lowered = category.to_lowercase();
            if !category.is_empty() && lowered.contains(&needle) && seen.insert(lowered) {
                suggestions.push(Suggestion::new(category.clone(), SuggestionKind::Category));
            }
        }

        suggestions.truncate(AUTOCOMPLETE_LIMIT);
        Ok(suggestions)
    }

    async fn filter_options(&self) -> BackendResult<FilterOptions> {
        let categories: BTreeSet<&String> = self
            .products
            .iter()
            .map(|p| &p.category)
            .filter(|c| !c.is_empty())
            .collect();
        let brands: BTreeSet<&String> = self
            .products
            .iter()
            .map(|p| &p.brand)
            .filter(|b| !b.is_empty())
            .collect();

        let mut price_range = PriceRange::default();
        for (i, product) in self.products.iter().enumerate() {
            if i == 0 {
                price_range = PriceRange {
                    min: product.price,
                    max: product.price,
                };
            } else {
                price_range.min = price_range.min.min(product.price);
                price_range.max = price_range.max.max(product.price);
            }
        }

        Ok(FilterOptions {
            categories: categories.into_iter().cloned().collect(),
            brands: brands.into_iter().cloned().collect(),
            price_range,
        })
    }

    async fn search_history(&self, limit: usize) -> BackendResult<Vec<SearchHistoryEntry>> {
        Ok(self
            .history
            .read()
            .recent(limit)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn popular_searches(&self, limit: usize) -> BackendResult<Vec<String>> {
        let popularity = self.popularity.read();
        let mut ranked: Vec<(&String, &u64)> = popularity.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        Ok(ranked
            .into_iter()
            .take(limit)
            .map(|(query, _)| query.clone())
            .collect())
    }

    async fn save_search(&self, query: &str, filters: &FlatFilters) -> BackendResult<()> {
        self.history.write().add(query, filters.clone());
        Ok(())
    }

    async fn track_search(
        &self,
        query: &str,
        _result_count: usize,
        _filters: &FlatFilters,
    ) -> BackendResult<()> {
        *self.popularity.write().entry(query.to_string()).or_insert(0) += 1;
        Ok(())
    }
}

/// Total order over f64 treating incomparable values as equal.
fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
