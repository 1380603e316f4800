//! Page evaluation over an abstract storage collaborator.
//!
//! # Responsibility
//! - Orchestrate validate -> resolve sort -> count -> slice for one request.
//! - Propagate the caller's cancellation signal into the storage
//!   collaborator at every step boundary.
//!
//! # Invariants
//! - The engine is a pure function of (source snapshot, request); it never
//!   mutates the source and keeps no state between calls.
//! - Count and slice must observe the same filtered set; sources provide
//!   that snapshot consistency (e.g. one read transaction per request).
//! - A fired cancellation discards partial work; no partial page is
//!   returned.

use crate::query::page::{PageRequest, PageResult};
use crate::query::sort::{ResolvedSort, SortRegistry};
use crate::query::{QueryError, QueryResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation signal shared between a caller and one or more
/// in-flight queries.
///
/// Cloning shares the underlying flag. The token only ever transitions from
/// active to cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    fired: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of every query observing this token.
    pub fn cancel(&self) {
        self.fired.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.fired.load(Ordering::Relaxed)
    }

    /// Returns [`QueryError::Cancelled`] once the token has fired.
    pub fn ensure_active(&self) -> QueryResult<()> {
        if self.is_cancelled() {
            return Err(QueryError::Cancelled);
        }
        Ok(())
    }
}

/// Storage collaborator contract: an orderable, filterable, countable
/// source of entities.
///
/// Implementations own their concurrency discipline; `count` and `slice`
/// issued for one logical request must observe the same filtered set.
pub trait PageSource {
    type Item;
    type Filter;

    /// Counts the filtered, unpaged set.
    fn count(&self, filter: Option<&Self::Filter>, cancel: &CancelToken) -> QueryResult<u64>;

    /// Fetches `take` items of the filtered set in the given total order,
    /// starting `skip` rows in. `order` is never empty.
    fn slice(
        &self,
        filter: Option<&Self::Filter>,
        order: &[ResolvedSort],
        skip: u64,
        take: u64,
        cancel: &CancelToken,
    ) -> QueryResult<Vec<Self::Item>>;
}

/// Evaluates one page request against a source.
///
/// Steps, in order: fail-fast request validation, sort resolution against
/// the entity's allow-list (empty sorts fall back to the registry default,
/// the primary-key tie-break is always appended), optional total count of
/// the filtered set, then the skip/take slice. Filter absence is a no-op.
///
/// # Errors
/// - Request/sort/filter violations surface as the matching
///   [`QueryError`] variant with no partial result.
/// - [`QueryError::Cancelled`] when `cancel` fires before completion.
/// - [`QueryError::Storage`] from the source, propagated without retries.
pub fn get_page<S: PageSource>(
    source: &S,
    registry: &SortRegistry,
    request: &PageRequest<S::Filter>,
    cancel: &CancelToken,
) -> QueryResult<PageResult<S::Item>> {
    request.validate()?;
    let order = registry.resolve(&request.sorts)?;
    cancel.ensure_active()?;

    let total = if request.include_total {
        Some(source.count(request.filter.as_ref(), cancel)?)
    } else {
        None
    };

    cancel.ensure_active()?;
    let mut items = source.slice(
        request.filter.as_ref(),
        &order,
        request.skip(),
        u64::from(request.page_size),
        cancel,
    )?;
    cancel.ensure_active()?;

    // The page contract caps items at page_size even if a source over-fetches.
    debug_assert!(items.len() <= request.page_size as usize);
    items.truncate(request.page_size as usize);

    Ok(PageResult {
        items,
        total,
        page_size: request.page_size,
        page_index: request.page_index,
    })
}

#[cfg(test)]
mod tests {
    use super::CancelToken;
    use crate::query::QueryError;

    #[test]
    fn token_starts_active_and_fires_once() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.ensure_active().unwrap();

        token.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(
            token.ensure_active(),
            Err(QueryError::Cancelled)
        ));
    }

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let observer = token.clone();
        token.cancel();
        assert!(observer.is_cancelled());
    }
}
