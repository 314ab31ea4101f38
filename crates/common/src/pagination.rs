//! Page parameter normalization for list queries.

use serde::{Deserialize, Serialize};

/// Page size used when the caller supplies none or an out-of-range value.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A normalized, zero-based page request.
///
/// Construction never fails: a negative page becomes the first page and a
/// page size outside `1..=100` falls back to [`DEFAULT_PAGE_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    /// Creates a page request, normalizing both parameters.
    pub fn new(page: i64, page_size: i64) -> Self {
        let page = page.max(0);
        let page_size = if (1..=MAX_PAGE_SIZE).contains(&page_size) {
            page_size
        } else {
            DEFAULT_PAGE_SIZE
        };
        Self { page, page_size }
    }

    /// Returns the zero-based page index.
    pub fn page(&self) -> i64 {
        self.page
    }

    /// Returns the number of entries per page.
    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Returns the number of entries to skip.
    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.page_size)
    }

    /// Returns the maximum number of entries to return.
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}
