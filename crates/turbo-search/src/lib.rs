//! Faceted search, filtering, and pagination core for TurboSearch.
//!
//! This crate is the synchronous heart of the search experience:
//!
//! - **Spec**: normalization of heterogeneous product specifications
//! - **Facets**: deterministic facet extraction over a product collection
//! - **Filters**: flat filters, nested selections, and the filter state
//! - **Query**: the canonical query and its deep-linkable URL form
//! - **Pagination**: page windows and boundary affordances
//! - **History**: bounded, deduplicated recent searches
//!
//! It performs no I/O; dispatching queries against a search service lives
//! in `turbo-search-engine`.
//!
//! # Example
//!
//! ```rust
//! use turbo_search::prelude::*;
//!
//! let products = vec![
//!     Product::new(1u64).with_spec(Specification::new("RAM", "8GB", Some("Performance"))),
//!     Product::new(2u64).with_spec(Specification::new("RAM", "16GB", Some("Performance"))),
//! ];
//!
//! // Derive the filter panel from the catalog.
//! let facets = extract_facets(&products);
//! assert_eq!(facets[0].values("RAM").unwrap(), &["16GB", "8GB"]);
//!
//! // Check a value and keep only matching products.
//! let mut state = FilterState::new(20);
//! let update = state.toggle_spec_value("Performance", "RAM", "8GB", true);
//! if let QueryUpdate::Dispatch(query) = update {
//!     let matching: Vec<_> = products
//!         .iter()
//!         .filter(|p| query.specs.matches(p))
//!         .collect();
//!     assert_eq!(matching.len(), 1);
//! }
//! ```

pub mod catalog;
pub mod facets;
pub mod filters;
pub mod history;
pub mod pagination;
pub mod query;
pub mod results;
pub mod spec;

pub use catalog::{Product, ProductId};
pub use query::SearchQuery;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::catalog::{Product, ProductId};
    pub use crate::facets::{extract_facets, FacetCategory, FacetExtractor, FacetScope};
    pub use crate::filters::{
        FilterSelection, FilterState, FlatFilterKey, FlatFilters, QueryUpdate, SortOption,
    };
    pub use crate::history::{SearchHistory, SearchHistoryEntry};
    pub use crate::pagination::{PageWindow, Pagination, MAX_VISIBLE_PAGES};
    pub use crate::query::SearchQuery;
    pub use crate::results::{
        FilterOptions, PriceRange, SearchResult, Suggestion, SuggestionKind,
    };
    pub use crate::spec::{normalize_specs, SpecEntry, Specification, DEFAULT_CATEGORY};
}
