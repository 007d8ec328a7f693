/// Persistence contracts
///
/// Use-cases and the HTTP layer depend on these traits only. Two
/// implementations ship: Postgres adapters in [`crate::postgres`] and
/// in-memory adapters in [`memory`] for tests and local runs.
///
/// # Pagination
///
/// List operations take a [`Page`] and return a [`PageOf`] carrying the
/// total so callers can render page controls without a second query.

use serde::{Deserialize, Serialize};

pub mod memory;
pub mod project;
pub mod task;
pub mod user;

pub use project::{ProjectFilter, ProjectRepository};
pub use task::{TaskFilter, TaskRepository};
pub use user::{UserFilter, UserRepository};

/// Page size applied when the caller does not pick one
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Hard cap on page size
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Limit and offset for list operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Builds a page, clamping the limit to `1..=MAX_PAGE_LIMIT` and the
    /// offset to zero or more
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
            offset: offset.max(0),
        }
    }

    /// Returns a copy with the same clamping applied
    ///
    /// Adapters call this on entry so hand-built pages cannot smuggle
    /// out-of-range values into queries.
    pub fn clamped(&self) -> Self {
        Self::new(self.limit, self.offset)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

/// One page of results plus the unpaged total
#[derive(Debug, Clone, Serialize)]
pub struct PageOf<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let page = Page::default();
        assert_eq!(page.limit, 50);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn test_page_clamps_limit_and_offset() {
        let page = Page::new(5000, -3);
        assert_eq!(page.limit, MAX_PAGE_LIMIT);
        assert_eq!(page.offset, 0);

        let page = Page::new(0, 10);
        assert_eq!(page.limit, 1);
        assert_eq!(page.offset, 10);
    }

    #[test]
    fn test_clamped_is_idempotent() {
        let page = Page::new(25, 100);
        assert_eq!(page.clamped(), page);
    }
}
