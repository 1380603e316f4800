//! Generic SQLite-backed page source.
//!
//! # Responsibility
//! - Implement the [`PageSource`] contract over one table/SELECT body.
//! - Compose per-entity filter translation and row parsing into SQL without
//!   the entities themselves knowing any SQL.
//!
//! # Invariants
//! - Filter values reach SQL only as bound parameters, never interpolated.
//! - Snapshot consistency between count and slice is the caller's duty:
//!   run both on one connection inside one read transaction.

use crate::query::engine::{CancelToken, PageSource};
use crate::query::page::SortDirection;
use crate::query::sort::{Collation, ResolvedSort};
use crate::query::{QueryError, QueryResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};

/// Translates a filter value into a SQL predicate. Returning an empty
/// predicate means the filter places no restriction.
pub type FilterTranslator<F> = fn(&F) -> QueryResult<SqlPredicate>;

/// Decodes one fetched row into an entity.
pub type RowParser<T> = fn(&Row<'_>) -> QueryResult<T>;

/// Conjunction of SQL clauses with their bound values.
#[derive(Debug, Clone, Default)]
pub struct SqlPredicate {
    clause: String,
    binds: Vec<Value>,
}

impl SqlPredicate {
    /// Appends one clause, AND-joined with any previous clauses.
    pub fn push(&mut self, clause: &str, binds: impl IntoIterator<Item = Value>) {
        if !self.clause.is_empty() {
            self.clause.push_str(" AND ");
        }
        self.clause.push_str(clause);
        self.binds.extend(binds);
    }

    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }
}

/// [`PageSource`] over one SQLite table.
///
/// `select_sql` is the projection used for slices (`SELECT ... FROM table`,
/// no WHERE). `base_clause` restricts every query of this source regardless
/// of filter, e.g. tombstone visibility.
pub struct SqliteSource<'conn, T, F> {
    conn: &'conn Connection,
    table: &'static str,
    select_sql: &'static str,
    base_clause: Option<&'static str>,
    translate: FilterTranslator<F>,
    parse_row: RowParser<T>,
}

impl<'conn, T, F> SqliteSource<'conn, T, F> {
    pub fn new(
        conn: &'conn Connection,
        table: &'static str,
        select_sql: &'static str,
        base_clause: Option<&'static str>,
        translate: FilterTranslator<F>,
        parse_row: RowParser<T>,
    ) -> Self {
        Self {
            conn,
            table,
            select_sql,
            base_clause,
            translate,
            parse_row,
        }
    }

    fn where_clause(&self, filter: Option<&F>) -> QueryResult<(String, Vec<Value>)> {
        let mut sql = String::from(" WHERE 1 = 1");
        let mut binds = Vec::new();

        if let Some(base) = self.base_clause {
            sql.push_str(" AND ");
            sql.push_str(base);
        }

        if let Some(filter) = filter {
            let predicate = (self.translate)(filter)?;
            if !predicate.is_empty() {
                sql.push_str(" AND ");
                sql.push_str(&predicate.clause);
                binds.extend(predicate.binds);
            }
        }

        Ok((sql, binds))
    }
}

impl<T, F> PageSource for SqliteSource<'_, T, F> {
    type Item = T;
    type Filter = F;

    fn count(&self, filter: Option<&F>, cancel: &CancelToken) -> QueryResult<u64> {
        cancel.ensure_active()?;

        let (where_sql, binds) = self.where_clause(filter)?;
        let sql = format!("SELECT COUNT(*) FROM {}{}", self.table, where_sql);
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(binds), |row| row.get(0))?;

        u64::try_from(count)
            .map_err(|_| QueryError::InvalidRow(format!("negative row count {count}")))
    }

    fn slice(
        &self,
        filter: Option<&F>,
        order: &[ResolvedSort],
        skip: u64,
        take: u64,
        cancel: &CancelToken,
    ) -> QueryResult<Vec<T>> {
        cancel.ensure_active()?;

        let (where_sql, mut binds) = self.where_clause(filter)?;
        let sql = format!(
            "{}{} ORDER BY {} LIMIT ? OFFSET ?",
            self.select_sql,
            where_sql,
            order_by_sql(order)
        );
        binds.push(Value::Integer(to_sql_window(take)?));
        binds.push(Value::Integer(to_sql_window(skip)?));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            cancel.ensure_active()?;
            items.push((self.parse_row)(row)?);
        }

        Ok(items)
    }
}

fn order_by_sql(order: &[ResolvedSort]) -> String {
    debug_assert!(!order.is_empty());

    order
        .iter()
        .map(|key| {
            let collate = match key.collation {
                Collation::Natural => "",
                Collation::CaseInsensitive => " COLLATE NOCASE",
            };
            let direction = match key.direction {
                SortDirection::Ascending => "ASC",
                SortDirection::Descending => "DESC",
            };
            format!("{}{collate} {direction}", key.column)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn to_sql_window(value: u64) -> QueryResult<i64> {
    i64::try_from(value).map_err(|_| QueryError::PageOutOfRange { skip: value })
}

/// Escapes `%`, `_` and the escape character itself for use in a
/// `LIKE ? ESCAPE '\'` pattern.
pub fn escape_like_pattern(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{escape_like_pattern, order_by_sql, SqlPredicate};
    use crate::query::page::SortDirection;
    use crate::query::sort::{Collation, ResolvedSort};
    use rusqlite::types::Value;

    #[test]
    fn predicate_joins_clauses_with_and() {
        let mut predicate = SqlPredicate::default();
        assert!(predicate.is_empty());

        predicate.push("status IN (?)", [Value::Text("created".to_string())]);
        predicate.push("created_at >= ?", [Value::Integer(100)]);

        assert_eq!(predicate.clause, "status IN (?) AND created_at >= ?");
        assert_eq!(predicate.binds.len(), 2);
    }

    #[test]
    fn order_by_renders_collation_then_direction() {
        let order = [
            ResolvedSort {
                column: "name",
                collation: Collation::CaseInsensitive,
                direction: SortDirection::Descending,
            },
            ResolvedSort {
                column: "id",
                collation: Collation::Natural,
                direction: SortDirection::Ascending,
            },
        ];
        assert_eq!(order_by_sql(&order), "name COLLATE NOCASE DESC, id ASC");
    }

    #[test]
    fn like_escape_covers_wildcards_and_backslash() {
        assert_eq!(escape_like_pattern("50%_done\\x"), "50\\%\\_done\\\\x");
        assert_eq!(escape_like_pattern("plain"), "plain");
    }
}
