//! Generic paginated query engine.
//!
//! # Responsibility
//! - Turn a filter + sort + page request into a deterministic, countable,
//!   paged result set over an arbitrary entity collection.
//! - Keep entity-specific knowledge (filter translation, sortable fields)
//!   in per-entity values supplied by the caller.
//!
//! # Invariants
//! - The engine holds no mutable state between calls; concurrent requests
//!   against independent sources need no synchronization.
//! - A returned page never has more items than the requested page size.
//! - A returned total always reflects the same filter as the items.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod engine;
pub mod page;
pub mod sort;
pub mod sqlite;

pub use engine::{get_page, CancelToken, PageSource};
pub use page::{PageRequest, PageResult, SortDirection, SortKey};
pub use sort::{Collation, ResolvedSort, SortColumn, SortRegistry};
pub use sqlite::{SqlPredicate, SqliteSource};

pub type QueryResult<T> = Result<T, QueryError>;

/// Error taxonomy for paged queries.
///
/// Caller errors (`InvalidPageSize`, `InvalidPageIndex`, `PageOutOfRange`,
/// `UnknownSortField`, `InvalidFilter`) are never retried. Storage failures
/// propagate as-is; retry policy belongs to the storage collaborator.
#[derive(Debug)]
pub enum QueryError {
    /// Page size must be positive; no silent clamping.
    InvalidPageSize(u32),
    /// Page index is 1-based and must be positive.
    InvalidPageIndex(u32),
    /// Requested window starts beyond the range the backend can address.
    PageOutOfRange { skip: u64 },
    /// Sort field is not in the entity's registered allow-list.
    UnknownSortField {
        entity: &'static str,
        field: String,
    },
    /// Filter value cannot be translated into a predicate.
    InvalidFilter(String),
    /// A fetched row does not decode into a valid entity.
    InvalidRow(String),
    /// Underlying storage failed; surfaced without retries.
    Storage(DbError),
    /// The caller's cancellation signal fired before completion.
    Cancelled,
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPageSize(size) => {
                write!(f, "page size must be positive, got {size}")
            }
            Self::InvalidPageIndex(index) => {
                write!(f, "page index is 1-based and must be positive, got {index}")
            }
            Self::PageOutOfRange { skip } => {
                write!(f, "page window at offset {skip} is not addressable")
            }
            Self::UnknownSortField { entity, field } => {
                write!(f, "unknown sort field `{field}` for entity `{entity}`")
            }
            Self::InvalidFilter(message) => write!(f, "invalid filter: {message}"),
            Self::InvalidRow(message) => write!(f, "invalid persisted row: {message}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::Cancelled => write!(f, "query cancelled before completion"),
        }
    }
}

impl Error for QueryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for QueryError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for QueryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}
