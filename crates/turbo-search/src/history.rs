//! Bounded recent-search history.
//!
//! Process-scoped state, owned and injected rather than global, so tests
//! can run isolated instances. Popularity ranking lives with the search
//! service; this module only keeps what the user themselves searched.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::filters::FlatFilters;
use crate::results::{Suggestion, SuggestionKind};

/// Entries kept before the oldest is evicted.
pub const HISTORY_CAP: usize = 10;

/// One remembered search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    /// The free-text query.
    pub query: String,
    /// Flat filters active when it ran.
    pub filters: FlatFilters,
    /// Unix timestamp.
    pub timestamp: i64,
}

/// Recent searches, newest first, deduplicated by query text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHistory {
    entries: VecDeque<SearchHistoryEntry>,
    #[serde(default = "default_cap")]
    cap: usize,
}

fn default_cap() -> usize {
    HISTORY_CAP
}

impl SearchHistory {
    /// Create a history with the default cap.
    pub fn new() -> Self {
        Self::with_cap(HISTORY_CAP)
    }

    /// Create a history with a custom cap.
    pub fn with_cap(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap.min(64)),
            cap: cap.max(1),
        }
    }

    /// Record a search.
    ///
    /// An existing entry with the same query text moves to the most-recent
    /// position with fresh filters and timestamp instead of duplicating.
    /// Beyond the cap, the oldest entry is evicted.
    pub fn add(&mut self, query: &str, filters: FlatFilters) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        self.entries.retain(|entry| entry.query != query);
        self.entries.push_front(SearchHistoryEntry {
            query: query.to_string(),
            filters,
            timestamp: current_timestamp(),
        });

        while self.entries.len() > self.cap {
            self.entries.pop_back();
        }
    }

    /// The `n` most recent entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<&SearchHistoryEntry> {
        self.entries.iter().take(n).collect()
    }

    /// All entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &SearchHistoryEntry> {
        self.entries.iter()
    }

    /// Shape the `n` most recent queries as autocomplete suggestions.
    pub fn as_suggestions(&self, n: usize) -> Vec<Suggestion> {
        self.entries
            .iter()
            .take(n)
            .map(|entry| Suggestion::new(entry.query.clone(), SuggestionKind::Query))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
