//! Page cursor.

use serde::Serialize;

/// Position of the next page to fetch for the current term.
///
/// `page` only advances after a fetch completes and resets to 1 whenever
/// the term changes. At most one fetch is in flight (`is_fetching`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageCursor {
    /// Next page to request (1-indexed).
    pub page: u32,
    /// Whether more pages may exist.
    pub has_more: bool,
    /// Whether a request is in flight.
    pub is_fetching: bool,
}

impl PageCursor {
    /// Cursor for a fresh term.
    pub fn first() -> Self {
        Self {
            page: 1,
            has_more: true,
            is_fetching: false,
        }
    }

    /// Check if the cursor is at its reset state.
    pub fn is_pristine(&self) -> bool {
        *self == Self::first()
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::first()
    }
}
