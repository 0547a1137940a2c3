//! Async query dispatch with stale-response suppression.
//!
//! Searches dispatch immediately; autocomplete waits out a debounce window
//! first. Each request class carries a monotonically increasing generation,
//! bumped at dispatch time. A response whose generation no longer matches
//! the counter is dropped without an event, so consumers only ever observe
//! the newest request's outcome regardless of backend completion order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use turbo_search::filters::FilterSelection;
use turbo_search::history::SearchHistory;
use turbo_search::pagination::Pagination;
use turbo_search::query::SearchQuery;
use turbo_search::results::{SearchResult, Suggestion};

use crate::backend::SearchBackend;
use crate::config::EngineConfig;

/// Events pushed to the consumer as async work settles.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    /// A search settled. Failures arrive as an empty result with the
    /// error marker set, never as a missing event.
    Results(SearchResult),
    /// Autocomplete settled for the newest input.
    Suggestions(Vec<Suggestion>),
    /// Input fell below the autocomplete threshold.
    SuggestionsCleared,
    /// The nested spec selection changed.
    FiltersChanged(FilterSelection),
    /// Every constraint was cleared; show the resting state.
    Cleared,
}

/// Fans queries out to a [`SearchBackend`] and reports outcomes as
/// [`SearchEvent`]s.
pub struct QueryDispatcher<B> {
    backend: Arc<B>,
    events: mpsc::UnboundedSender<SearchEvent>,
    search_gen: Arc<AtomicU64>,
    autocomplete_gen: Arc<AtomicU64>,
    history: Arc<Mutex<SearchHistory>>,
    last_pagination: Arc<Mutex<Option<Pagination>>>,
    debounce: Duration,
    min_autocomplete_len: usize,
}

impl<B: SearchBackend + 'static> QueryDispatcher<B> {
    pub fn new(
        backend: Arc<B>,
        events: mpsc::UnboundedSender<SearchEvent>,
        history: Arc<Mutex<SearchHistory>>,
        last_pagination: Arc<Mutex<Option<Pagination>>>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            backend,
            events,
            search_gen: Arc::new(AtomicU64::new(0)),
            autocomplete_gen: Arc::new(AtomicU64::new(0)),
            history,
            last_pagination,
            debounce: Duration::from_millis(config.debounce_ms),
            min_autocomplete_len: config.min_autocomplete_len,
        }
    }

    /// Dispatch a search immediately.
    ///
    /// On success with a non-blank query text and at least one product, the
    /// query is recorded in local history and persisted via the backend's
    /// `save_search`/`track_search` hooks after the result event is sent.
    pub fn dispatch_search(&self, query: SearchQuery) {
        let generation = self.search_gen.fetch_add(1, Ordering::SeqCst) + 1;
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let search_gen = Arc::clone(&self.search_gen);
        let history = Arc::clone(&self.history);
        let last_pagination = Arc::clone(&self.last_pagination);

        debug!(generation, "dispatching search");
        tokio::spawn(async move {
            let outcome = backend.search(&query).await;
            if search_gen.load(Ordering::SeqCst) != generation {
                debug!(generation, "discarding stale search response");
                return;
            }

            let result = match outcome {
                Ok(result) => result,
                Err(err) => {
                    warn!(error = %err, "search request failed");
                    SearchResult::failed(err.to_string())
                }
            };

            let text = query.q.as_deref().map(str::trim).unwrap_or("");
            let record = !result.is_error() && !result.is_empty() && !text.is_empty();
            let result_count = result.len();

            if record {
                history.lock().add(text, query.filters.clone());
            }
            *last_pagination.lock() = Some(result.pagination);
            let _ = events.send(SearchEvent::Results(result));

            if record {
                if let Err(err) = backend.save_search(text, &query.filters).await {
                    debug!(error = %err, "save_search failed");
                }
                if let Err(err) = backend.track_search(text, result_count, &query.filters).await {
                    debug!(error = %err, "track_search failed");
                }
            }
        });
    }

    /// Dispatch autocomplete for the current input, debounced.
    ///
    /// The generation bumps before the threshold check so a pending request
    /// is cancelled even when the input shrinks below the minimum.
    pub fn dispatch_autocomplete(&self, text: impl Into<String>) {
        let text = text.into();
        let generation = self.autocomplete_gen.fetch_add(1, Ordering::SeqCst) + 1;

        if text.trim().chars().count() < self.min_autocomplete_len {
            let _ = self.events.send(SearchEvent::SuggestionsCleared);
            return;
        }

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();
        let autocomplete_gen = Arc::clone(&self.autocomplete_gen);
        let debounce = self.debounce;

        tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            if autocomplete_gen.load(Ordering::SeqCst) != generation {
                debug!(generation, "debounced input superseded");
                return;
            }

            let outcome = backend.autocomplete(&text).await;
            if autocomplete_gen.load(Ordering::SeqCst) != generation {
                debug!(generation, "discarding stale suggestions");
                return;
            }

            match outcome {
                Ok(suggestions) => {
                    let _ = events.send(SearchEvent::Suggestions(suggestions));
                }
                Err(err) => {
                    warn!(error = %err, "autocomplete failed");
                    let _ = events.send(SearchEvent::Suggestions(Vec::new()));
                }
            }
        });
    }

    /// Cancel pending work and report the cleared state.
    pub fn dispatch_clear(&self) {
        self.search_gen.fetch_add(1, Ordering::SeqCst);
        self.autocomplete_gen.fetch_add(1, Ordering::SeqCst);
        *self.last_pagination.lock() = None;
        let _ = self.events.send(SearchEvent::Cleared);
    }

    /// Report a changed spec selection.
    pub fn notify_filters_changed(&self, selection: FilterSelection) {
        let _ = self.events.send(SearchEvent::FiltersChanged(selection));
    }
}
