//! Page tracking for the photo feed.
//!
//! Pages are numbered from 1. The cursor only moves forward once a page has
//! been merged into the feed, so a failed load is retried with the same
//! page number on the next call.

/// Page size used when none is configured.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Tracks the next page to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    next: u32,
    per_page: u32,
}

impl PageCursor {
    /// Create a cursor at page 1.
    ///
    /// A zero page size is bumped to 1.
    pub fn new(per_page: u32) -> Self {
        Self {
            next: 1,
            per_page: per_page.max(1),
        }
    }

    /// Page number the next request should ask for.
    pub fn next_page(&self) -> u32 {
        self.next
    }

    /// Number of items requested per page.
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of pages merged so far.
    pub fn loaded_pages(&self) -> u32 {
        self.next - 1
    }

    /// Record that `page` was merged.
    ///
    /// Only the page the cursor is waiting for moves it forward; any other
    /// page number is ignored and `false` is returned.
    pub fn advance(&mut self, page: u32) -> bool {
        if page != self.next {
            return false;
        }
        self.next = self.next.saturating_add(1);
        true
    }

    /// Go back to page 1, keeping the page size.
    pub fn reset(&mut self) {
        self.next = 1;
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}
