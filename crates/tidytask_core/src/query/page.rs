//! Page request/result value objects.
//!
//! # Responsibility
//! - Describe one paged query: window, optional filter, sort keys, whether a
//!   total count is wanted.
//! - Echo the window back with the results so callers can render paging UI.
//!
//! # Invariants
//! - `page_index` is 1-based; `page_size` and `page_index` must be positive.
//! - Values are immutable per-request objects and are never persisted.

use crate::query::{QueryError, QueryResult};
use serde::{Deserialize, Serialize};

/// Page size used when a caller does not pick one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Ordering direction for one sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// One (field, direction) pair of a multi-key ordering.
///
/// Sequence order is tie-break precedence: the first key is the primary
/// sort, later keys only order rows that are equal on every earlier key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Logical field name on the target entity.
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }
}

/// Caller-supplied paging, filter, and sort parameters for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest<F> {
    /// Maximum items per page; must be positive.
    pub page_size: u32,
    /// 1-based page number; must be positive.
    pub page_index: u32,
    /// Optional entity-specific filter; absence means all entities.
    pub filter: Option<F>,
    /// Multi-key ordering; empty means the entity's default order.
    pub sorts: Vec<SortKey>,
    /// Whether to count the filtered, unpaged set.
    pub include_total: bool,
}

impl<F> Default for PageRequest<F> {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_index: 1,
            filter: None,
            sorts: Vec::new(),
            include_total: true,
        }
    }
}

impl<F> PageRequest<F> {
    /// Creates a request for the given window with no filter, default order
    /// and total counting enabled.
    pub fn new(page_size: u32, page_index: u32) -> Self {
        Self {
            page_size,
            page_index,
            ..Self::default()
        }
    }

    /// Number of rows before the requested window.
    pub fn skip(&self) -> u64 {
        u64::from(self.page_index.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Fails fast on an unusable window.
    ///
    /// # Errors
    /// - [`QueryError::InvalidPageSize`] when `page_size == 0`.
    /// - [`QueryError::InvalidPageIndex`] when `page_index == 0`.
    /// - [`QueryError::PageOutOfRange`] when the window offset cannot be
    ///   addressed by storage backends.
    pub fn validate(&self) -> QueryResult<()> {
        if self.page_size == 0 {
            return Err(QueryError::InvalidPageSize(self.page_size));
        }
        if self.page_index == 0 {
            return Err(QueryError::InvalidPageIndex(self.page_index));
        }
        let skip = self.skip();
        if skip > i64::MAX as u64 {
            return Err(QueryError::PageOutOfRange { skip });
        }
        Ok(())
    }
}

/// Paged items plus optional total count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult<T> {
    /// At most `page_size` items in the requested order.
    pub items: Vec<T>,
    /// Count of the filtered, unpaged set; `None` when not requested.
    pub total: Option<u64>,
    /// Echoed from the request.
    pub page_size: u32,
    /// Echoed from the request.
    pub page_index: u32,
}

impl<T> PageResult<T> {
    /// Projects items into a caller-facing shape, keeping paging metadata.
    ///
    /// The projection must be a pure function; it runs once per item.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page_size: self.page_size,
            page_index: self.page_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PageRequest, PageResult, QueryError, SortKey};

    #[test]
    fn skip_is_zero_based_window_offset() {
        let request: PageRequest<()> = PageRequest::new(25, 3);
        assert_eq!(request.skip(), 50);
    }

    #[test]
    fn validate_rejects_zero_page_size_and_index() {
        let request: PageRequest<()> = PageRequest::new(0, 1);
        assert!(matches!(
            request.validate(),
            Err(QueryError::InvalidPageSize(0))
        ));

        let request: PageRequest<()> = PageRequest::new(10, 0);
        assert!(matches!(
            request.validate(),
            Err(QueryError::InvalidPageIndex(0))
        ));
    }

    #[test]
    fn validate_rejects_unaddressable_window() {
        let request: PageRequest<()> = PageRequest::new(u32::MAX, u32::MAX);
        assert!(matches!(
            request.validate(),
            Err(QueryError::PageOutOfRange { .. })
        ));
    }

    #[test]
    fn map_keeps_paging_metadata() {
        let page = PageResult {
            items: vec![1_i64, 2, 3],
            total: Some(7),
            page_size: 3,
            page_index: 2,
        };

        let mapped = page.map(|value| value.to_string());
        assert_eq!(mapped.items, vec!["1", "2", "3"]);
        assert_eq!(mapped.total, Some(7));
        assert_eq!(mapped.page_size, 3);
        assert_eq!(mapped.page_index, 2);
    }

    #[test]
    fn sort_key_helpers_set_direction() {
        assert_eq!(
            SortKey::descending("name"),
            SortKey::new("name", super::SortDirection::Descending)
        );
    }
}
