//! Search result envelope and related response types.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::facets::FacetCategory;
use crate::pagination::Pagination;

/// A settled search response.
///
/// Failures never propagate past the dispatcher as errors; they arrive
/// here as an empty result with `error` set, so consumers always hold a
/// well-formed value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Matching products for the current page.
    pub products: Vec<Product>,
    /// Pagination metadata.
    pub pagination: Pagination,
    /// Facets, when the query requested them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub facets: Vec<FacetCategory>,
    /// "Did you mean" suggestions, populated only for empty results.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
    /// Failure marker for transport or backend errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Query time in milliseconds.
    #[serde(default)]
    pub query_time_ms: i64,
}

impl SearchResult {
    /// Create a result page.
    pub fn new(products: Vec<Product>, pagination: Pagination) -> Self {
        Self {
            products,
            pagination,
            facets: Vec::new(),
            suggestions: Vec::new(),
            error: None,
            query_time_ms: 0,
        }
    }

    /// Create an empty result.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Pagination::default())
    }

    /// Create an empty result carrying an error marker.
    pub fn failed(message: impl Into<String>) -> Self {
        let mut result = Self::empty();
        result.error = Some(message.into());
        result
    }

    /// Attach facets.
    pub fn with_facets(mut self, facets: Vec<FacetCategory>) -> Self {
        self.facets = facets;
        self
    }

    /// Attach suggestions.
    pub fn with_suggestions(mut self, suggestions: Vec<Suggestion>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// Set the query time.
    pub fn with_query_time(mut self, ms: i64) -> Self {
        self.query_time_ms = ms;
        self
    }

    /// Whether the page has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Number of products on this page.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether this result marks a failure.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

impl Default for SearchResult {
    fn default() -> Self {
        Self::empty()
    }
}

/// An autocomplete or "did you mean" suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Suggested text.
    pub text: String,
    /// What the suggestion points at.
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
}

impl Suggestion {
    pub fn new(text: impl Into<String>, kind: SuggestionKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Kind of suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    /// A product title.
    Product,
    /// A brand name.
    Brand,
    /// A category name.
    Category,
    /// A past or popular query.
    Query,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::Product => "product",
            SuggestionKind::Brand => "brand",
            SuggestionKind::Category => "category",
            SuggestionKind::Query => "query",
        }
    }
}

/// Option lists a UI offers for the flat filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Known categories, sorted.
    pub categories: Vec<String>,
    /// Known brands, sorted.
    pub brands: Vec<String>,
    /// Observed price bounds.
    pub price_range: PriceRange,
}

/// Inclusive price bounds across a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_result_is_empty_with_marker() {
        let result = SearchResult::failed("connection refused");
        assert!(result.is_empty());
        assert!(result.is_error());
        assert_eq!(result.error.as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_suggestion_kind_serializes_as_type() {
        let suggestion = Suggestion::new("laptop", SuggestionKind::Category);
        let json = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(json["type"], "category");
        assert_eq!(json["text"], "laptop");
    }

    #[test]
    fn test_result_envelope_roundtrips() {
        let result = SearchResult::empty()
            .with_suggestions(vec![Suggestion::new("phone", SuggestionKind::Query)])
            .with_query_time(12);

        let json = serde_json::to_string(&result).unwrap();
        let back: SearchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
