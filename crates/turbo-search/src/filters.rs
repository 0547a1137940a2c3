//! Filter state: flat filters, nested specification selections, and the
//! manager that turns user mutations into canonical queries.
//!
//! Two invariants hold at every public-API boundary:
//! - flat filters never store absent values as empty strings; a cleared key
//!   is removed, so serialized queries carry no no-op keys;
//! - the nested selection never contains an empty value list or an empty
//!   category map; containers are pruned the moment their last value goes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::Product;
use crate::query::SearchQuery;

/// Sort options for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Relevance (default for text search).
    #[default]
    Relevance,
    /// Price, low to high.
    PriceAsc,
    /// Price, high to low.
    PriceDesc,
    /// Highest rated first.
    Rating,
    /// Newest first.
    Newest,
    /// Name A-Z.
    Name,
}

impl SortOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Relevance => "relevance",
            SortOption::PriceAsc => "price_asc",
            SortOption::PriceDesc => "price_desc",
            SortOption::Rating => "rating",
            SortOption::Newest => "newest",
            SortOption::Name => "name",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relevance" => Some(SortOption::Relevance),
            "price_asc" => Some(SortOption::PriceAsc),
            "price_desc" => Some(SortOption::PriceDesc),
            "rating" => Some(SortOption::Rating),
            "newest" => Some(SortOption::Newest),
            "name" => Some(SortOption::Name),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::Relevance => "Relevance",
            SortOption::PriceAsc => "Price: Low to High",
            SortOption::PriceDesc => "Price: High to Low",
            SortOption::Rating => "Highest Rated",
            SortOption::Newest => "Newest",
            SortOption::Name => "Name: A-Z",
        }
    }

    /// Whether this is the default sort (treated as unset).
    pub fn is_default(&self) -> bool {
        *self == SortOption::Relevance
    }
}

/// Keys of the flat (single-valued) filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlatFilterKey {
    Category,
    Brand,
    MinPrice,
    MaxPrice,
    Rating,
    InStock,
    SortBy,
}

impl FlatFilterKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlatFilterKey::Category => "category",
            FlatFilterKey::Brand => "brand",
            FlatFilterKey::MinPrice => "minPrice",
            FlatFilterKey::MaxPrice => "maxPrice",
            FlatFilterKey::Rating => "rating",
            FlatFilterKey::InStock => "inStock",
            FlatFilterKey::SortBy => "sortBy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "category" => Some(FlatFilterKey::Category),
            "brand" => Some(FlatFilterKey::Brand),
            "minPrice" => Some(FlatFilterKey::MinPrice),
            "maxPrice" => Some(FlatFilterKey::MaxPrice),
            "rating" => Some(FlatFilterKey::Rating),
            "inStock" => Some(FlatFilterKey::InStock),
            "sortBy" => Some(FlatFilterKey::SortBy),
            _ => None,
        }
    }
}

/// Single-valued search constraints.
///
/// An unset key is `None`, never an empty string. The default sort counts
/// as unset for both serialization and the active-filter count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FlatFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
    #[serde(default, skip_serializing_if = "SortOption::is_default")]
    pub sort_by: SortOption,
}

impl FlatFilters {
    /// Set or clear a key from its string form.
    ///
    /// Empty strings clear the key; so do values that fail to parse for
    /// numeric and boolean keys (a half-typed price bound is no bound).
    pub fn set(&mut self, key: FlatFilterKey, value: &str) {
        let value = value.trim();
        match key {
            FlatFilterKey::Category => {
                self.category = non_empty(value);
            }
            FlatFilterKey::Brand => {
                self.brand = non_empty(value);
            }
            FlatFilterKey::MinPrice => {
                self.min_price = value.parse().ok();
            }
            FlatFilterKey::MaxPrice => {
                self.max_price = value.parse().ok();
            }
            FlatFilterKey::Rating => {
                self.rating = value.parse().ok();
            }
            FlatFilterKey::InStock => {
                self.in_stock = parse_bool(value);
            }
            FlatFilterKey::SortBy => {
                self.sort_by = SortOption::from_str(value).unwrap_or_default();
            }
        }
    }

    /// Number of keys carrying a value (default sort excluded).
    pub fn active_count(&self) -> usize {
        let mut count = 0;
        count += self.category.is_some() as usize;
        count += self.brand.is_some() as usize;
        count += self.min_price.is_some() as usize;
        count += self.max_price.is_some() as usize;
        count += self.rating.is_some() as usize;
        count += self.in_stock.is_some() as usize;
        count += !self.sort_by.is_default() as usize;
        count
    }

    /// Whether every key is unset.
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Whether a product satisfies every set constraint.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category {
            if !product.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(brand) = &self.brand {
            if !product.brand.eq_ignore_ascii_case(brand) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if product.price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.price > max {
                return false;
            }
        }
        if let Some(rating) = self.rating {
            if product.rating < rating {
                return false;
            }
        }
        if let Some(in_stock) = self.in_stock {
            if product.in_stock() != in_stock {
                return false;
            }
        }
        true
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Nested specification selection: category → spec name → checked values.
///
/// Containers are pruned on removal, so the active-filter count is a plain
/// double-sum and iteration never sees empty maps or lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct FilterSelection(BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check or uncheck a value for (category, spec name).
    ///
    /// Checking inserts the value once; unchecking removes it and prunes
    /// any container it leaves empty.
    pub fn toggle(&mut self, category: &str, spec_name: &str, value: &str, checked: bool) {
        if checked {
            let values = self
                .0
                .entry(category.to_string())
                .or_default()
                .entry(spec_name.to_string())
                .or_default();
            if !values.iter().any(|v| v == value) {
                values.push(value.to_string());
            }
        } else {
            let Some(specs) = self.0.get_mut(category) else {
                return;
            };
            if let Some(values) = specs.get_mut(spec_name) {
                values.retain(|v| v != value);
                if values.is_empty() {
                    specs.remove(spec_name);
                }
            }
            if specs.is_empty() {
                self.0.remove(category);
            }
        }
    }

    /// Drop every selection under a category.
    pub fn clear_category(&mut self, category: &str) {
        self.0.remove(category);
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Checked values for (category, spec name), if any.
    pub fn selected(&self, category: &str, spec_name: &str) -> Option<&[String]> {
        self.0
            .get(category)
            .and_then(|specs| specs.get(spec_name))
            .map(Vec::as_slice)
    }

    /// Whether a specific value is checked.
    pub fn is_selected(&self, category: &str, spec_name: &str, value: &str) -> bool {
        self.selected(category, spec_name)
            .is_some_and(|values| values.iter().any(|v| v == value))
    }

    /// Iterate (category, spec name, values) triples.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String, &Vec<String>)> {
        self.0.iter().flat_map(|(category, specs)| {
            specs.iter().map(move |(name, values)| (category, name, values))
        })
    }

    /// Total number of checked values.
    pub fn active_count(&self) -> usize {
        self.iter().map(|(_, _, values)| values.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a product carries, for every selected (category, spec name),
    /// at least one of the checked values.
    pub fn matches(&self, product: &Product) -> bool {
        if self.is_empty() {
            return true;
        }
        let specs = product.normalized_specs();
        self.iter().all(|(category, name, values)| {
            specs.iter().any(|s| {
                s.category == *category && s.name == *name && values.iter().any(|v| v == &s.value)
            })
        })
    }
}

/// Outcome of a filter-state mutation.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum QueryUpdate {
    /// At least one selection is active; dispatch this query.
    Dispatch(SearchQuery),
    /// Everything is empty; clear results instead of requesting.
    Clear,
}

/// Owner of the current search selection.
///
/// Holds the free-text query, flat filters, nested selection, and paging,
/// and produces the canonical [`SearchQuery`] snapshot after each mutation.
/// Any constraint change resets paging to the first page.
#[derive(Debug, Clone)]
pub struct FilterState {
    query_text: String,
    flat: FlatFilters,
    selection: FilterSelection,
    page: i64,
    limit: i64,
    include_facets: bool,
}

impl FilterState {
    /// Create a state with the given page size.
    pub fn new(limit: i64) -> Self {
        Self {
            query_text: String::new(),
            flat: FlatFilters::default(),
            selection: FilterSelection::new(),
            page: 1,
            limit: limit.max(1),
            include_facets: false,
        }
    }

    /// Request facets with every dispatched query.
    pub fn with_facets(mut self) -> Self {
        self.include_facets = true;
        self
    }

    /// Replace the free-text query. Resets paging.
    pub fn set_query_text(&mut self, text: impl Into<String>) {
        self.query_text = text.into();
        self.page = 1;
    }

    /// Set or clear a flat filter. Resets paging.
    pub fn set_flat_filter(&mut self, key: FlatFilterKey, value: &str) -> QueryUpdate {
        self.flat.set(key, value);
        self.page = 1;
        self.refresh()
    }

    /// Check or uncheck a specification value. Resets paging.
    pub fn toggle_spec_value(
        &mut self,
        category: &str,
        spec_name: &str,
        value: &str,
        checked: bool,
    ) -> QueryUpdate {
        self.selection.toggle(category, spec_name, value, checked);
        self.page = 1;
        self.refresh()
    }

    /// Change the sort order. Resets paging.
    pub fn set_sort(&mut self, sort: SortOption) -> QueryUpdate {
        self.flat.sort_by = sort;
        self.page = 1;
        self.refresh()
    }

    /// Clear all flat filters and selections (query text stays).
    pub fn clear_all(&mut self) -> QueryUpdate {
        self.flat = FlatFilters::default();
        self.selection.clear();
        self.page = 1;
        self.refresh()
    }

    /// Clear one category's selections.
    pub fn clear_category(&mut self, category: &str) -> QueryUpdate {
        self.selection.clear_category(category);
        self.page = 1;
        self.refresh()
    }

    /// Move to a page. Callers validate the bound first.
    pub fn set_page(&mut self, page: i64) -> QueryUpdate {
        self.page = page.max(1);
        self.refresh()
    }

    /// Query update for the current state: a dispatchable query when any
    /// selection is active, a clear signal otherwise.
    pub fn refresh(&self) -> QueryUpdate {
        if self.has_any_selection() {
            QueryUpdate::Dispatch(self.to_query())
        } else {
            QueryUpdate::Clear
        }
    }

    /// Whether any free text or filter is active.
    pub fn has_any_selection(&self) -> bool {
        !self.query_text.trim().is_empty() || !self.flat.is_empty() || !self.selection.is_empty()
    }

    /// Exact count of active filters (leaf selections plus set flat keys).
    pub fn active_filter_count(&self) -> usize {
        self.flat.active_count() + self.selection.active_count()
    }

    /// Snapshot the canonical query.
    pub fn to_query(&self) -> SearchQuery {
        let trimmed = self.query_text.trim();
        SearchQuery {
            q: if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            },
            filters: self.flat.clone(),
            specs: self.selection.clone(),
            page: self.page,
            limit: self.limit,
            include_facets: self.include_facets,
        }
    }

    pub fn query_text(&self) -> &str {
        &self.query_text
    }

    pub fn flat_filters(&self) -> &FlatFilters {
        &self.flat
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(crate::query::DEFAULT_LIMIT)
    }
}
