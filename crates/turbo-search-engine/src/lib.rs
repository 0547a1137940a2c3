//! Async search orchestration for TurboSearch.
//!
//! This crate drives queries against a pluggable backend and reports
//! settled outcomes as events:
//!
//! - **Backend**: the [`SearchBackend`] trait and an in-memory implementation
//! - **Dispatcher**: debounced autocomplete and stale-response suppression
//! - **Engine**: filter state, session history, and pagination in one facade
//!
//! # Example
//!
//! ```rust
//! use turbo_search::prelude::*;
//! use turbo_search_engine::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = InMemoryBackend::new(vec![
//!         Product::new(1u64).with_title("Aurora Laptop 14"),
//!         Product::new(2u64).with_title("Pebble Phone"),
//!     ]);
//!
//!     let mut engine = SearchEngine::new(backend);
//!     let mut events = engine.take_events().unwrap();
//!
//!     engine.set_query_text("laptop");
//!     engine.submit();
//!
//!     match events.recv().await {
//!         Some(SearchEvent::Results(result)) => assert_eq!(result.len(), 1),
//!         other => panic!("expected results, got {other:?}"),
//!     }
//! }
//! ```

pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod memory;

pub use backend::{BackendError, BackendResult, SearchBackend};
pub use dispatcher::SearchEvent;
pub use engine::SearchEngine;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::backend::{BackendError, BackendResult, SearchBackend};
    pub use crate::config::EngineConfig;
    pub use crate::dispatcher::{QueryDispatcher, SearchEvent};
    pub use crate::engine::SearchEngine;
    pub use crate::memory::InMemoryBackend;
}
