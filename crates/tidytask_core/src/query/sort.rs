//! Sort specification resolution.
//!
//! # Responsibility
//! - Map logical sort field names to storage projections through a
//!   per-entity allow-list.
//! - Own the default order used when a request carries no sort keys.
//!
//! # Invariants
//! - Field names outside the allow-list are rejected, never passed through
//!   to a query backend.
//! - Resolution always appends the entity's primary-key tie-break, so the
//!   resulting order is total and paging is deterministic.
//! - Collation is declared once per field; direction is applied after the
//!   projection, never to the collation choice.

use crate::query::page::{SortDirection, SortKey};
use crate::query::{QueryError, QueryResult};

/// Comparison policy for one sortable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collation {
    /// Natural ordering of the stored value (numbers, timestamps).
    Natural,
    /// Case-insensitive text ordering.
    CaseInsensitive,
}

/// One entry of an entity's sortable-field allow-list.
#[derive(Debug, Clone, Copy)]
pub struct SortColumn {
    /// Logical field name accepted from callers.
    pub field: &'static str,
    /// Storage projection (column) the field maps to.
    pub column: &'static str,
    pub collation: Collation,
}

/// A sort key resolved against the allow-list, ready for a storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSort {
    pub column: &'static str,
    pub collation: Collation,
    pub direction: SortDirection,
}

/// Sortable-field registry for one entity kind.
pub struct SortRegistry {
    entity: &'static str,
    fields: &'static [SortColumn],
    default_order: &'static [(&'static str, SortDirection)],
    tie_break: &'static str,
}

impl SortRegistry {
    /// Declares the registry for one entity kind.
    ///
    /// `default_order` names registered fields used when a request has no
    /// sort keys; `tie_break` is the primary-key column appended (ascending)
    /// to every resolved order.
    pub const fn new(
        entity: &'static str,
        fields: &'static [SortColumn],
        default_order: &'static [(&'static str, SortDirection)],
        tie_break: &'static str,
    ) -> Self {
        Self {
            entity,
            fields,
            default_order,
            tie_break,
        }
    }

    /// Entity kind this registry serves.
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Resolves requested sort keys into a total order.
    ///
    /// Empty input resolves to the registry's default order. The tie-break
    /// column is always the last resolved key.
    ///
    /// # Errors
    /// - [`QueryError::UnknownSortField`] for a field outside the allow-list.
    pub fn resolve(&self, sorts: &[SortKey]) -> QueryResult<Vec<ResolvedSort>> {
        let mut resolved = Vec::with_capacity(sorts.len().max(self.default_order.len()) + 1);

        if sorts.is_empty() {
            for (field, direction) in self.default_order {
                resolved.push(self.resolve_one(field, *direction)?);
            }
        } else {
            for key in sorts {
                resolved.push(self.resolve_one(&key.field, key.direction)?);
            }
        }

        resolved.push(ResolvedSort {
            column: self.tie_break,
            collation: Collation::Natural,
            direction: SortDirection::Ascending,
        });

        Ok(resolved)
    }

    fn resolve_one(&self, field: &str, direction: SortDirection) -> QueryResult<ResolvedSort> {
        self.fields
            .iter()
            .find(|candidate| candidate.field == field)
            .map(|candidate| ResolvedSort {
                column: candidate.column,
                collation: candidate.collation,
                direction,
            })
            .ok_or_else(|| QueryError::UnknownSortField {
                entity: self.entity,
                field: field.to_string(),
            })
    }
}
