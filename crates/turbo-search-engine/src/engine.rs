//! Search engine facade.
//!
//! Owns the filter state, a dispatcher, session history, and the last seen
//! pagination. Mutations go through [`FilterState`] so the empty/dispatch
//! decision and page resets stay in one place; settled outcomes arrive on
//! the event channel handed out by [`SearchEngine::take_events`].

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use turbo_search::filters::{
    FilterSelection, FilterState, FlatFilterKey, FlatFilters, QueryUpdate, SortOption,
};
use turbo_search::history::{SearchHistory, SearchHistoryEntry};
use turbo_search::pagination::{PageWindow, Pagination};
use turbo_search::results::{FilterOptions, Suggestion, SuggestionKind};

use crate::backend::{BackendResult, SearchBackend};
use crate::config::EngineConfig;
use crate::dispatcher::{QueryDispatcher, SearchEvent};

/// Orchestrates search over a [`SearchBackend`].
pub struct SearchEngine<B> {
    backend: Arc<B>,
    state: FilterState,
    dispatcher: QueryDispatcher<B>,
    history: Arc<Mutex<SearchHistory>>,
    last_pagination: Arc<Mutex<Option<Pagination>>>,
    events: Option<mpsc::UnboundedReceiver<SearchEvent>>,
    config: EngineConfig,
}

impl<B: SearchBackend + 'static> SearchEngine<B> {
    /// Create an engine with default configuration.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, EngineConfig::default())
    }

    /// Create an engine with explicit configuration.
    pub fn with_config(backend: B, config: EngineConfig) -> Self {
        let backend = Arc::new(backend);
        let (tx, rx) = mpsc::unbounded_channel();
        let history = Arc::new(Mutex::new(SearchHistory::with_cap(config.history_cap)));
        let last_pagination = Arc::new(Mutex::new(None));

        let mut state = FilterState::new(config.default_limit);
        if config.include_facets {
            state = state.with_facets();
        }

        let dispatcher = QueryDispatcher::new(
            Arc::clone(&backend),
            tx,
            Arc::clone(&history),
            Arc::clone(&last_pagination),
            &config,
        );

        Self {
            backend,
            state,
            dispatcher,
            history,
            last_pagination,
            events: Some(rx),
            config,
        }
    }

    /// Take the event receiver. Yields `Some` exactly once.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<SearchEvent>> {
        self.events.take()
    }

    /// Update the query text as the user types.
    ///
    /// Dispatches debounced autocomplete only; the search itself waits for
    /// [`SearchEngine::submit`].
    pub fn set_query_text(&mut self, text: &str) {
        self.state.set_query_text(text);
        self.dispatcher.dispatch_autocomplete(text);
    }

    /// Dispatch a search for the current state.
    pub fn submit(&self) {
        self.apply(self.state.refresh());
    }

    /// Set or clear a flat filter and re-search.
    pub fn set_flat_filter(&mut self, key: FlatFilterKey, value: &str) {
        let update = self.state.set_flat_filter(key, value);
        self.apply(update);
    }

    /// Check or uncheck a specification value and re-search.
    pub fn toggle_spec_value(
        &mut self,
        category: &str,
        spec_name: &str,
        value: &str,
        checked: bool,
    ) {
        let update = self.state.toggle_spec_value(category, spec_name, value, checked);
        self.dispatcher
            .notify_filters_changed(self.state.selection().clone());
        self.apply(update);
    }

    /// Change the sort order and re-search.
    pub fn set_sort(&mut self, sort: SortOption) {
        let update = self.state.set_sort(sort);
        self.apply(update);
    }

    /// Drop every filter (query text stays) and re-search.
    pub fn clear_filters(&mut self) {
        let update = self.state.clear_all();
        self.dispatcher
            .notify_filters_changed(self.state.selection().clone());
        self.apply(update);
    }

    /// Drop one category's selections and re-search.
    pub fn clear_category(&mut self, category: &str) {
        let update = self.state.clear_category(category);
        self.dispatcher
            .notify_filters_changed(self.state.selection().clone());
        self.apply(update);
    }

    /// Move to a page of the last known result set.
    ///
    /// Out-of-range pages are rejected locally without a dispatch, so a
    /// misbehaving pager cannot produce surplus traffic.
    pub fn go_to_page(&mut self, page: i64) -> bool {
        let known = *self.last_pagination.lock();
        match known {
            Some(pagination) if pagination.contains(page) => {
                let update = self.state.set_page(page);
                self.apply(update);
                true
            }
            _ => {
                debug!(page, "page out of range, ignoring");
                false
            }
        }
    }

    pub fn next_page(&mut self) -> bool {
        self.go_to_page(self.state.page() + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.go_to_page(self.state.page() - 1)
    }

    /// Pagination of the most recent result, if any.
    pub fn pagination(&self) -> Option<Pagination> {
        *self.last_pagination.lock()
    }

    /// Visible page window for the most recent result, if any.
    pub fn page_window(&self) -> Option<PageWindow> {
        let pagination = *self.last_pagination.lock();
        pagination.map(|p| p.window(self.config.max_visible_pages))
    }

    pub fn query_text(&self) -> &str {
        self.state.query_text()
    }

    pub fn flat_filters(&self) -> &FlatFilters {
        self.state.flat_filters()
    }

    pub fn selection(&self) -> &FilterSelection {
        self.state.selection()
    }

    /// Exact count of active filters.
    pub fn active_filter_count(&self) -> usize {
        self.state.active_filter_count()
    }

    pub fn has_any_selection(&self) -> bool {
        self.state.has_any_selection()
    }

    /// Most recent session searches, newest first.
    pub fn recent_searches(&self, limit: usize) -> Vec<SearchHistoryEntry> {
        self.history
            .lock()
            .recent(limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Session history shaped as suggestions.
    pub fn history_suggestions(&self, limit: usize) -> Vec<Suggestion> {
        self.history.lock().as_suggestions(limit)
    }

    /// Popular queries from the backend, shaped as suggestions.
    pub async fn popular_searches(&self, limit: usize) -> BackendResult<Vec<Suggestion>> {
        let popular = self.backend.popular_searches(limit).await?;
        Ok(popular
            .into_iter()
            .map(|query| Suggestion::new(query, SuggestionKind::Query))
            .collect())
    }

    /// Filter option lists from the backend.
    pub async fn filter_options(&self) -> BackendResult<FilterOptions> {
        self.backend.filter_options().await
    }

    fn apply(&self, update: QueryUpdate) {
        match update {
            QueryUpdate::Dispatch(query) => self.dispatcher.dispatch_search(query),
            QueryUpdate::Clear => self.dispatcher.dispatch_clear(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turbo_search::catalog::Product;
    use turbo_search::spec::Specification;

    use crate::memory::InMemoryBackend;

    fn demo_engine() -> SearchEngine<InMemoryBackend> {
        SearchEngine::new(InMemoryBackend::new(vec![
            Product::new(1u64)
                .with_title("Aurora Laptop 14")
                .with_brand("Aurora")
                .with_spec(Specification::new("RAM", "8GB", Some("Performance"))),
            Product::new(2u64)
                .with_title("Aurora Laptop 16")
                .with_brand("Aurora")
                .with_spec(Specification::new("RAM", "16GB", Some("Performance"))),
        ]))
    }

    #[tokio::test]
    async fn test_events_hand_over_exactly_once() {
        let mut engine = demo_engine();
        assert!(engine.take_events().is_some());
        assert!(engine.take_events().is_none());
    }

    #[tokio::test]
    async fn test_submit_with_no_constraints_clears() {
        let mut engine = demo_engine();
        let mut events = engine.take_events().unwrap();

        engine.submit();

        assert!(matches!(events.recv().await, Some(SearchEvent::Cleared)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_submit_delivers_results() {
        let mut engine = demo_engine();
        let mut events = engine.take_events().unwrap();

        engine.set_query_text("laptop");
        engine.submit();

        match events.recv().await {
            Some(SearchEvent::Results(result)) => assert_eq!(result.len(), 2),
            other => panic!("expected results, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_toggle_reports_selection_then_results() {
        let mut engine = demo_engine();
        let mut events = engine.take_events().unwrap();

        engine.toggle_spec_value("Performance", "RAM", "8GB", true);

        match events.recv().await {
            Some(SearchEvent::FiltersChanged(selection)) => {
                assert!(selection.is_selected("Performance", "RAM", "8GB"));
            }
            other => panic!("expected filters-changed, got {other:?}"),
        }
        match events.recv().await {
            Some(SearchEvent::Results(result)) => {
                assert_eq!(result.len(), 1);
                assert_eq!(result.products[0].id.value(), 1);
            }
            other => panic!("expected results, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_clearing_the_last_filter_clears_results() {
        let mut engine = demo_engine();
        let mut events = engine.take_events().unwrap();

        engine.set_flat_filter(FlatFilterKey::Brand, "Aurora");
        engine.clear_filters();

        // The brand search is superseded by the clear before it settles.
        match events.recv().await {
            Some(SearchEvent::FiltersChanged(selection)) => assert!(selection.is_empty()),
            other => panic!("expected filters-changed, got {other:?}"),
        }
        assert!(matches!(events.recv().await, Some(SearchEvent::Cleared)));
    }

    #[tokio::test]
    async fn test_page_changes_are_validated_locally() {
        let mut engine = demo_engine();
        let mut events = engine.take_events().unwrap();

        // No result seen yet: every page is out of range.
        assert!(!engine.go_to_page(2));

        engine.set_flat_filter(FlatFilterKey::Brand, "Aurora");
        match events.recv().await {
            Some(SearchEvent::Results(_)) => {}
            other => panic!("expected results, got {other:?}"),
        }

        // Two products on one page.
        assert!(engine.go_to_page(1));
        assert!(!engine.go_to_page(2));
        assert!(!engine.next_page());
    }

    #[tokio::test]
    async fn test_active_filter_count_spans_flat_and_nested() {
        let mut engine = demo_engine();
        let _events = engine.take_events().unwrap();

        engine.set_flat_filter(FlatFilterKey::Brand, "Aurora");
        engine.toggle_spec_value("Performance", "RAM", "8GB", true);
        engine.toggle_spec_value("Performance", "RAM", "16GB", true);

        assert_eq!(engine.active_filter_count(), 3);
    }

    #[tokio::test]
    async fn test_popular_searches_arrive_as_query_suggestions() {
        let mut engine = demo_engine();
        let mut events = engine.take_events().unwrap();

        engine.set_query_text("laptop");
        engine.submit();
        match events.recv().await {
            Some(SearchEvent::Results(_)) => {}
            other => panic!("expected results, got {other:?}"),
        }

        let popular = engine.popular_searches(5).await.unwrap();
        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].text, "laptop");
        assert_eq!(popular[0].kind, SuggestionKind::Query);
    }

    #[tokio::test]
    async fn test_session_history_records_submitted_text() {
        let mut engine = demo_engine();
        let mut events = engine.take_events().unwrap();

        engine.set_query_text("laptop");
        engine.submit();
        match events.recv().await {
            Some(SearchEvent::Results(_)) => {}
            other => panic!("expected results, got {other:?}"),
        }

        let recent = engine.recent_searches(5);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].query, "laptop");

        let suggestions = engine.history_suggestions(5);
        assert_eq!(suggestions[0].kind, SuggestionKind::Query);
    }
}
