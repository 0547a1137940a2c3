//! Canonical search query and its query-string form.
//!
//! The query string is the deep-link contract: every key carrying a value
//! appears as a parameter, nothing else does, and parsing the string back
//! reconstructs an equivalent query. The nested specification selection
//! travels as compact JSON in a single `specs` parameter.

use serde::{Deserialize, Serialize};

use crate::filters::{FilterSelection, FlatFilterKey, FlatFilters, SortOption};

/// Default page size.
pub const DEFAULT_LIMIT: i64 = 20;

/// The single query object that crosses the search-service boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Free-text query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// Flat filters.
    #[serde(flatten)]
    pub filters: FlatFilters,
    /// Nested specification selection.
    #[serde(default, skip_serializing_if = "FilterSelection::is_empty")]
    pub specs: FilterSelection,
    /// Current page (1-indexed).
    #[serde(default = "default_page")]
    pub page: i64,
    /// Items per page.
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Whether to include facets in results.
    #[serde(default, skip_serializing_if = "is_false")]
    pub include_facets: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl SearchQuery {
    /// Create an empty query.
    pub fn new() -> Self {
        Self {
            q: None,
            filters: FlatFilters::default(),
            specs: FilterSelection::new(),
            page: 1,
            limit: DEFAULT_LIMIT,
            include_facets: false,
        }
    }

    /// Set the free-text query.
    pub fn with_text(mut self, q: impl Into<String>) -> Self {
        let q = q.into();
        if !q.is_empty() {
            self.q = Some(q);
        }
        self
    }

    /// Set the flat filters.
    pub fn with_filters(mut self, filters: FlatFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Set the nested selection.
    pub fn with_selection(mut self, specs: FilterSelection) -> Self {
        self.specs = specs;
        self
    }

    /// Set the sort order.
    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.filters.sort_by = sort;
        self
    }

    /// Set pagination.
    pub fn with_pagination(mut self, page: i64, limit: i64) -> Self {
        self.page = page.max(1);
        self.limit = limit.clamp(1, 100);
        self
    }

    /// Request facets with the results.
    pub fn with_facets(mut self) -> Self {
        self.include_facets = true;
        self
    }

    /// Offset of the first item on the current page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// Serialize to URL query parameters.
    ///
    /// Keys without a value are omitted, as are paging defaults, so the
    /// produced string carries no no-op parameters.
    pub fn to_query_string(&self) -> String {
        let mut params: Vec<(&str, String)> = Vec::new();

        if let Some(q) = &self.q {
            if !q.is_empty() {
                params.push(("q", q.clone()));
            }
        }
        if let Some(category) = &self.filters.category {
            params.push(("category", category.clone()));
        }
        if let Some(brand) = &self.filters.brand {
            params.push(("brand", brand.clone()));
        }
        if let Some(min) = self.filters.min_price {
            params.push(("minPrice", min.to_string()));
        }
        if let Some(max) = self.filters.max_price {
            params.push(("maxPrice", max.to_string()));
        }
        if let Some(rating) = self.filters.rating {
            params.push(("rating", rating.to_string()));
        }
        if let Some(in_stock) = self.filters.in_stock {
            params.push(("inStock", in_stock.to_string()));
        }
        if !self.filters.sort_by.is_default() {
            params.push(("sortBy", self.filters.sort_by.as_str().to_string()));
        }
        if !self.specs.is_empty() {
            if let Ok(json) = serde_json::to_string(&self.specs) {
                params.push(("specs", json));
            }
        }
        if self.page > 1 {
            params.push(("page", self.page.to_string()));
        }
        if self.limit != DEFAULT_LIMIT {
            params.push(("limit", self.limit.to_string()));
        }
        if self.include_facets {
            params.push(("facets", "true".to_string()));
        }

        params
            .iter()
            .map(|(key, value)| format!("{}={}", key, encode_component(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parse URL query parameters back into a query.
    ///
    /// Unknown keys and unparseable values are ignored; a leading `?` is
    /// tolerated. Parsing the output of [`Self::to_query_string`] yields an
    /// equal query.
    pub fn from_query_string(input: &str) -> Self {
        let mut query = SearchQuery::new();
        let input = input.strip_prefix('?').unwrap_or(input);

        for pair in input.split('&') {
            let Some((key, raw)) = pair.split_once('=') else {
                continue;
            };
            let value = decode_component(raw);

            match key {
                "q" => {
                    if !value.is_empty() {
                        query.q = Some(value);
                    }
                }
                "specs" => {
                    if let Ok(specs) = serde_json::from_str(&value) {
                        query.specs = specs;
                    }
                }
                "page" => {
                    query.page = value.parse().unwrap_or(1).max(1);
                }
                "limit" => {
                    query.limit = value.parse().unwrap_or(DEFAULT_LIMIT).clamp(1, 100);
                }
                "facets" => {
                    query.include_facets = value == "true" || value == "1";
                }
                _ => {
                    if let Some(flat_key) = FlatFilterKey::from_str(key) {
                        query.filters.set(flat_key, &value);
                    }
                }
            }
        }

        query
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// Percent-encode a query-string component. Unreserved characters pass
/// through, spaces become `+`.
fn encode_component(s: &str) -> String {
    let mut result = String::with_capacity(s.len() * 3);
    for c in s.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '~' => result.push(c),
            ' ' => result.push('+'),
            _ => {
                for byte in c.to_string().as_bytes() {
                    result.push_str(&format!("%{:02X}", byte));
                }
            }
        }
    }
    result
}

/// Decode a percent-encoded component.
///
/// Decoded bytes are collected before UTF-8 conversion so multi-byte
/// sequences survive. Malformed escapes pass through literally.
fn decode_component(s: &str) -> String {
    let raw = s.as_bytes();
    let mut bytes = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        match raw[i] {
            b'+' => {
                bytes.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < raw.len() => {
                match (hex_value(raw[i + 1]), hex_value(raw[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        bytes.push(hi * 16 + lo);
                        i += 3;
                    }
                    _ => {
                        bytes.push(b'%');
                        i += 1;
                    }
                }
            }
            byte => {
                bytes.push(byte);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let query = SearchQuery::new()
            .with_text("rust book")
            .with_sort(SortOption::PriceAsc)
            .with_pagination(2, 10);

        assert_eq!(query.page, 2);
        assert_eq!(query.limit, 10);
        assert_eq!(query.offset(), 10);
        assert_eq!(query.filters.sort_by, SortOption::PriceAsc);
    }

    #[test]
    fn test_empty_query_serializes_to_nothing() {
        assert_eq!(SearchQuery::new().to_query_string(), "");
        assert_eq!(SearchQuery::from_query_string(""), SearchQuery::new());
    }

    #[test]
    fn test_only_set_keys_appear() {
        let mut filters = FlatFilters::default();
        filters.set(FlatFilterKey::Brand, "Acme");
        let query = SearchQuery::new().with_filters(filters);

        assert_eq!(query.to_query_string(), "brand=Acme");
    }

    #[test]
    fn test_round_trip_full_query() {
        let mut filters = FlatFilters::default();
        filters.set(FlatFilterKey::Category, "laptops");
        filters.set(FlatFilterKey::Brand, "Acme & Co");
        filters.set(FlatFilterKey::MinPrice, "99.5");
        filters.set(FlatFilterKey::MaxPrice, "1500");
        filters.set(FlatFilterKey::Rating, "4");
        filters.set(FlatFilterKey::InStock, "true");
        filters.set(FlatFilterKey::SortBy, "price_desc");

        let mut specs = FilterSelection::new();
        specs.toggle("Performance", "RAM", "8GB", true);
        specs.toggle("Performance", "RAM", "16GB", true);
        specs.toggle("Display", "Panel", "IPS", true);

        let query = SearchQuery::new()
            .with_text("gaming laptop")
            .with_filters(filters)
            .with_selection(specs)
            .with_pagination(3, 50)
            .with_facets();

        let round_tripped = SearchQuery::from_query_string(&query.to_query_string());
        assert_eq!(round_tripped, query);
    }

    #[test]
    fn test_round_trip_unicode_text() {
        let query = SearchQuery::new().with_text("ordinateur portable — écran");
        let round_tripped = SearchQuery::from_query_string(&query.to_query_string());
        assert_eq!(round_tripped, query);
    }

    #[test]
    fn test_parse_ignores_unknown_keys_and_bare_tokens() {
        let query = SearchQuery::from_query_string("?brand=Acme&utm_source=mail&noise");
        assert_eq!(query.filters.brand.as_deref(), Some("Acme"));
        assert_eq!(query.filters.active_count(), 1);
    }

    #[test]
    fn test_parse_clamps_paging() {
        let query = SearchQuery::from_query_string("page=0&limit=9999");
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 100);
    }

    #[test]
    fn test_plus_decodes_to_space() {
        let query = SearchQuery::from_query_string("q=rust+book");
        assert_eq!(query.q.as_deref(), Some("rust book"));
    }

    #[test]
    fn test_encode_component_escapes_reserved() {
        assert_eq!(encode_component("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_component("50% off"), "50%25+off");
    }

    #[test]
    fn test_decode_component_handles_multibyte() {
        assert_eq!(decode_component("%E2%82%AC100"), "€100");
    }

    #[test]
    fn test_decode_component_passes_malformed_escapes_through() {
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%G1"), "%G1");
        assert_eq!(decode_component("%2"), "%2");
    }

    #[test]
    fn test_specs_param_is_compact_json() {
        let mut specs = FilterSelection::new();
        specs.toggle("Performance", "RAM", "8GB", true);
        let query = SearchQuery::new().with_selection(specs);

        let serialized = query.to_query_string();
        assert!(serialized.starts_with("specs="));

        let parsed = SearchQuery::from_query_string(&serialized);
        assert!(parsed.specs.is_selected("Performance", "RAM", "8GB"));
    }

    #[test]
    fn test_malformed_specs_param_is_dropped() {
        let query = SearchQuery::from_query_string("specs=%7Bnot-json&brand=Acme");
        assert!(query.specs.is_empty());
        assert_eq!(query.filters.brand.as_deref(), Some("Acme"));
    }
}
