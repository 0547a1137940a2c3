//! Pagination metadata and the visible page window.

use serde::{Deserialize, Serialize};

/// Page numbers shown at once in a pagination control.
pub const MAX_VISIBLE_PAGES: usize = 5;

/// Pagination metadata for a result set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page (1-indexed).
    pub current_page: i64,
    /// Total number of pages (at least 1).
    pub total_pages: i64,
    /// Total number of matching products.
    pub total_products: i64,
    /// Items per page.
    pub limit: i64,
    /// Whether there's a next page.
    pub has_next: bool,
    /// Whether there's a previous page.
    pub has_prev: bool,
}

impl Pagination {
    /// Compute metadata from (page, limit, total).
    pub fn new(current_page: i64, limit: i64, total_products: i64) -> Self {
        let limit = limit.max(1);
        let total_pages = if total_products == 0 {
            1
        } else {
            (total_products + limit - 1) / limit
        };

        Self {
            current_page,
            total_pages,
            total_products,
            limit,
            has_next: current_page < total_pages,
            has_prev: current_page > 1,
        }
    }

    /// Whether a pagination control is worth rendering at all.
    pub fn is_needed(&self) -> bool {
        self.total_pages > 1
    }

    /// Whether a page number is in range.
    pub fn contains(&self, page: i64) -> bool {
        page >= 1 && page <= self.total_pages
    }

    /// Visible page window centered on the current page.
    ///
    /// The window always holds exactly `min(max_visible, total_pages)`
    /// pages: when the high end truncates it, the start is pulled back so
    /// the count stays constant.
    pub fn window(&self, max_visible: usize) -> PageWindow {
        let total = self.total_pages.max(1);
        let max = max_visible.max(1) as i64;
        let current = self.current_page.clamp(1, total);

        let start = (current - max / 2).max(1);
        let end = (start + max - 1).min(total);
        let start = (end - max + 1).max(1);

        PageWindow {
            pages: (start..=end).collect(),
            show_leading: start > 1,
            show_trailing: end < total,
        }
    }

    /// Number of the first item on this page (1-indexed, 0 when empty).
    pub fn start_item(&self) -> i64 {
        if self.total_products == 0 {
            0
        } else {
            (self.current_page - 1) * self.limit + 1
        }
    }

    /// Number of the last item on this page.
    pub fn end_item(&self) -> i64 {
        (self.current_page * self.limit).min(self.total_products)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, crate::query::DEFAULT_LIMIT, 0)
    }
}

/// The page numbers a pagination control shows, with boundary affordances.
///
/// `show_leading` asks for a "1 …" prefix, `show_trailing` for a
/// "… <last page>" suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// Consecutive page numbers to render.
    pub pages: Vec<i64>,
    /// Window does not start at page 1.
    pub show_leading: bool,
    /// Window does not reach the last page.
    pub show_trailing: bool,
}
