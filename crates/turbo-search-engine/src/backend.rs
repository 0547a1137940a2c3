//! The search-service boundary.

use async_trait::async_trait;
use thiserror::Error;

use turbo_search::filters::FlatFilters;
use turbo_search::history::SearchHistoryEntry;
use turbo_search::query::SearchQuery;
use turbo_search::results::{FilterOptions, SearchResult, Suggestion};

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors a search backend can produce.
///
/// These never reach engine consumers as errors; the dispatcher converts
/// every failure into an empty, error-marked result.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Failed to build the request.
    #[error("Request error: {0}")]
    Request(String),

    /// Could not reach the service.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// The service answered with an error status.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// The response body did not parse.
    #[error("Failed to deserialize response: {0}")]
    Deserialization(String),

    /// Backend-specific failure.
    #[error("Backend error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::Deserialization(e.to_string())
    }
}

/// A search service the engine can dispatch against.
///
/// Implementations own timeout and retry policy; the engine adds no
/// timeouts of its own.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute a search.
    async fn search(&self, query: &SearchQuery) -> BackendResult<SearchResult>;

    /// Fetch autocomplete suggestions for partial query text.
    async fn autocomplete(&self, text: &str) -> BackendResult<Vec<Suggestion>>;

    /// Fetch the option lists for flat filters.
    async fn filter_options(&self) -> BackendResult<FilterOptions>;

    /// Fetch server-side search history.
    async fn search_history(&self, limit: usize) -> BackendResult<Vec<SearchHistoryEntry>>;

    /// Fetch the most popular queries.
    async fn popular_searches(&self, limit: usize) -> BackendResult<Vec<String>>;

    /// Persist a search for history purposes.
    async fn save_search(&self, query: &str, filters: &FlatFilters) -> BackendResult<()>;

    /// Report a search to analytics.
    async fn track_search(
        &self,
        query: &str,
        result_count: usize,
        filters: &FlatFilters,
    ) -> BackendResult<()>;
}
