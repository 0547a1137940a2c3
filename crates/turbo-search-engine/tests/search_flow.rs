//! End-to-end flows through the engine, against a scripted backend for
//! response-ordering cases and the in-memory backend for catalog semantics.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use turbo_search::catalog::Product;
use turbo_search::filters::{FlatFilterKey, FlatFilters};
use turbo_search::pagination::Pagination;
use turbo_search::query::SearchQuery;
use turbo_search::results::{FilterOptions, SearchResult, Suggestion, SuggestionKind};
use turbo_search::spec::Specification;
use turbo_search_engine::prelude::*;

/// Backend whose search responses are released by the test, so completion
/// order can be forced out of dispatch order.
#[derive(Clone)]
struct ScriptedBackend {
    inner: Arc<ScriptedInner>,
}

struct ScriptedInner {
    responses: Mutex<VecDeque<oneshot::Receiver<BackendResult<SearchResult>>>>,
    searches: Mutex<Vec<SearchQuery>>,
    autocompletes: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    fn new() -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                responses: Mutex::new(VecDeque::new()),
                searches: Mutex::new(Vec::new()),
                autocompletes: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Queue a response slot; the returned sender releases it.
    fn expect_search(&self) -> oneshot::Sender<BackendResult<SearchResult>> {
        let (tx, rx) = oneshot::channel();
        self.inner.responses.lock().push_back(rx);
        tx
    }

    fn recorded_searches(&self) -> Vec<SearchQuery> {
        self.inner.searches.lock().clone()
    }

    fn recorded_autocompletes(&self) -> Vec<String> {
        self.inner.autocompletes.lock().clone()
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn search(&self, query: &SearchQuery) -> BackendResult<SearchResult> {
        self.inner.searches.lock().push(query.clone());
        let slot = self.inner.responses.lock().pop_front();
        match slot {
            Some(rx) => match rx.await {
                Ok(outcome) => outcome,
                Err(_) => Ok(SearchResult::empty()),
            },
            None => Ok(SearchResult::empty()),
        }
    }

    async fn autocomplete(&self, text: &str) -> BackendResult<Vec<Suggestion>> {
        self.inner.autocompletes.lock().push(text.to_string());
        Ok(vec![Suggestion::new(text, SuggestionKind::Query)])
    }

    async fn filter_options(&self) -> BackendResult<FilterOptions> {
        Ok(FilterOptions::default())
    }

    async fn search_history(
        &self,
        _limit: usize,
    ) -> BackendResult<Vec<turbo_search::history::SearchHistoryEntry>> {
        Ok(Vec::new())
    }

    async fn popular_searches(&self, _limit: usize) -> BackendResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn save_search(&self, _query: &str, _filters: &FlatFilters) -> BackendResult<()> {
        Ok(())
    }

    async fn track_search(
        &self,
        _query: &str,
        _result_count: usize,
        _filters: &FlatFilters,
    ) -> BackendResult<()> {
        Ok(())
    }
}

/// Await the next settled search, skipping interleaved suggestion and
/// filter events.
async fn next_results(events: &mut mpsc::UnboundedReceiver<SearchEvent>) -> SearchResult {
    loop {
        match events.recv().await {
            Some(SearchEvent::Results(result)) => return result,
            Some(_) => continue,
            None => panic!("event channel closed"),
        }
    }
}

fn nimbus_catalog() -> Vec<Product> {
    vec![
        Product::new(1u64)
            .with_title("Nimbus Book 14")
            .with_category("laptops")
            .with_brand("Nimbus")
            .with_price(999.0)
            .with_spec(Specification::new("RAM", "8GB", Some("Performance")))
            .with_spec(Specification::new("Storage", "256GB", Some("Performance"))),
        Product::new(2u64)
            .with_title("Nimbus Book 16")
            .with_category("laptops")
            .with_brand("Nimbus")
            .with_price(1499.0)
            .with_spec(Specification::new("RAM", "16GB", Some("Performance")))
            .with_spec(Specification::new("Storage", "512GB", Some("Performance"))),
        Product::new(3u64)
            .with_title("Pebble Phone")
            .with_category("phones")
            .with_brand("Pebble")
            .with_price(499.0),
    ]
}

#[tokio::test]
async fn test_late_response_for_superseded_query_is_dropped() {
    let backend = ScriptedBackend::new();
    let handle = backend.clone();
    let mut engine = SearchEngine::new(backend);
    let mut events = engine.take_events().unwrap();

    let first = handle.expect_search();
    let second = handle.expect_search();

    engine.set_flat_filter(FlatFilterKey::Brand, "Aurora");
    engine.set_flat_filter(FlatFilterKey::MinPrice, "100");

    // The newer request settles first.
    second
        .send(Ok(SearchResult::new(
            vec![Product::new(2u64).with_title("Aurora 16")],
            Pagination::new(1, 20, 1),
        )))
        .unwrap();

    let result = next_results(&mut events).await;
    assert_eq!(result.len(), 1);
    assert_eq!(result.products[0].id.value(), 2);

    // The older response arrives late and must be swallowed.
    first
        .send(Ok(SearchResult::new(
            vec![Product::new(9u64).with_title("Stale")],
            Pagination::new(1, 20, 99),
        )))
        .unwrap();
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(events.try_recv().is_err());
    assert_eq!(engine.pagination().unwrap().total_products, 1);

    let recorded = handle.recorded_searches();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].filters.brand.as_deref(), Some("Aurora"));
    assert_eq!(recorded[0].filters.min_price, None);
    assert_eq!(recorded[1].filters.min_price, Some(100.0));
}

#[tokio::test(start_paused = true)]
async fn test_autocomplete_debounce_coalesces_rapid_typing() {
    let backend = ScriptedBackend::new();
    let handle = backend.clone();
    let mut engine = SearchEngine::new(backend);
    let mut events = engine.take_events().unwrap();

    // Below the two-character threshold: cleared, nothing dispatched.
    engine.set_query_text("p");
    assert!(matches!(
        events.recv().await,
        Some(SearchEvent::SuggestionsCleared)
    ));

    // Two keystrokes inside one debounce window.
    engine.set_query_text("ph");
    tokio::time::advance(Duration::from_millis(200)).await;
    engine.set_query_text("pho");

    match events.recv().await {
        Some(SearchEvent::Suggestions(suggestions)) => {
            assert_eq!(suggestions.len(), 1);
            assert_eq!(suggestions[0].text, "pho");
        }
        other => panic!("expected suggestions, got {other:?}"),
    }

    // Only the final input reached the backend.
    assert_eq!(handle.recorded_autocompletes(), vec!["pho".to_string()]);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_spec_selection_narrows_products_not_facets() {
    let mut engine = SearchEngine::new(InMemoryBackend::new(nimbus_catalog()));
    let mut events = engine.take_events().unwrap();

    engine.toggle_spec_value("Performance", "RAM", "8GB", true);

    match events.recv().await {
        Some(SearchEvent::FiltersChanged(selection)) => {
            assert!(selection.is_selected("Performance", "RAM", "8GB"));
        }
        other => panic!("expected filters-changed, got {other:?}"),
    }

    let result = next_results(&mut events).await;
    assert_eq!(result.len(), 1);
    assert_eq!(result.products[0].id.value(), 1);

    let performance = result
        .facets
        .iter()
        .find(|f| f.category_name == "Performance")
        .unwrap();
    assert_eq!(
        performance.values("RAM").unwrap(),
        &["16GB".to_string(), "8GB".to_string()]
    );

    // Unchecking the last constraint clears results outright.
    engine.toggle_spec_value("Performance", "RAM", "8GB", false);
    assert!(matches!(
        events.recv().await,
        Some(SearchEvent::FiltersChanged(_))
    ));
    assert!(matches!(events.recv().await, Some(SearchEvent::Cleared)));
    assert_eq!(engine.active_filter_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_query_moves_to_front_of_history() {
    let mut engine = SearchEngine::new(InMemoryBackend::new(nimbus_catalog()));
    let mut events = engine.take_events().unwrap();

    for text in ["phone", "laptop", "phone"] {
        engine.set_query_text(text);
        engine.submit();
        let result = next_results(&mut events).await;
        assert!(!result.is_empty());
    }

    let recent = engine.recent_searches(10);
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].query, "phone");
    assert_eq!(recent[1].query, "laptop");
}

#[tokio::test]
async fn test_backend_failure_surfaces_as_error_result() {
    let backend = ScriptedBackend::new();
    let handle = backend.clone();
    let mut engine = SearchEngine::new(backend);
    let mut events = engine.take_events().unwrap();

    let slot = handle.expect_search();
    engine.set_query_text("laptop");
    engine.submit();
    slot.send(Err(BackendError::Timeout(5_000))).unwrap();

    let result = next_results(&mut events).await;
    assert!(result.is_error());
    assert!(result.is_empty());
    assert!(result.error.unwrap().contains("5000ms"));

    // Failed searches do not pollute history.
    assert!(engine.recent_searches(5).is_empty());
}

#[tokio::test]
async fn test_out_of_range_pages_never_reach_the_backend() {
    let backend = ScriptedBackend::new();
    let handle = backend.clone();
    let mut engine = SearchEngine::new(backend);
    let mut events = engine.take_events().unwrap();

    let slot = handle.expect_search();
    engine.set_query_text("laptop");
    engine.submit();
    slot.send(Ok(SearchResult::new(
        vec![Product::new(1u64)],
        Pagination::new(1, 20, 45),
    )))
    .unwrap();

    let result = next_results(&mut events).await;
    assert_eq!(result.pagination.total_pages, 3);

    assert!(!engine.go_to_page(4));
    assert!(!engine.go_to_page(0));
    assert_eq!(handle.recorded_searches().len(), 1);

    let slot = handle.expect_search();
    assert!(engine.go_to_page(2));
    slot.send(Ok(SearchResult::new(
        vec![Product::new(21u64)],
        Pagination::new(2, 20, 45),
    )))
    .unwrap();
    next_results(&mut events).await;

    let recorded = handle.recorded_searches();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[1].page, 2);

    let window = engine.page_window().unwrap();
    assert_eq!(window.pages, vec![1, 2, 3]);
    assert!(!window.show_leading);
    assert!(!window.show_trailing);
}

#[tokio::test]
async fn test_clearing_filters_keeps_query_text_live() {
    let mut engine = SearchEngine::new(InMemoryBackend::new(nimbus_catalog()));
    let mut events = engine.take_events().unwrap();

    engine.set_query_text("nimbus");
    engine.set_flat_filter(FlatFilterKey::MaxPrice, "1000");
    let result = next_results(&mut events).await;
    assert_eq!(result.len(), 1);

    // Text survives the filter reset, so this re-searches instead of
    // clearing.
    engine.clear_filters();
    let result = next_results(&mut events).await;
    assert_eq!(result.len(), 2);
    assert_eq!(engine.query_text(), "nimbus");
    assert_eq!(engine.active_filter_count(), 0);
}
