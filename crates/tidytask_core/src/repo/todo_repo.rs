//! Todo repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over canonical `todos` storage.
//! - Compose the paged query engine into the todo search use-case: filter
//!   translation, sortable-field allow-list, default order.
//!
//! # Invariants
//! - Write paths must call `TodoItem::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Search runs count and slice inside one read transaction so both see
//!   the same snapshot.

use crate::audit::AuditStamp;
use crate::db::{migrations, DbError};
use crate::model::todo::{TodoId, TodoItem, TodoStatus, TodoValidationError};
use crate::query::engine::{get_page, CancelToken};
use crate::query::page::{PageRequest, PageResult, SortDirection};
use crate::query::sort::{Collation, SortColumn, SortRegistry};
use crate::query::sqlite::{escape_like_pattern, SqlPredicate, SqliteSource};
use crate::query::{QueryError, QueryResult};
use log::{error, info};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

const TODO_SELECT_SQL: &str = "SELECT
    id,
    name,
    status,
    is_deleted
FROM todos";

const REQUIRED_TODO_COLUMNS: &[&str] =
    &["id", "name", "status", "created_at", "updated_at", "is_deleted"];

/// Sortable-field allow-list for the todo entity.
///
/// Default order when a request carries no sort keys is `created_at`
/// ascending; `id` is the stable tie-break on every order.
pub const TODO_SORT_FIELDS: SortRegistry = SortRegistry::new(
    "todo",
    &[
        SortColumn {
            field: "name",
            column: "name",
            collation: Collation::CaseInsensitive,
        },
        SortColumn {
            field: "status",
            column: "status",
            collation: Collation::Natural,
        },
        SortColumn {
            field: "created_at",
            column: "created_at",
            collation: Collation::Natural,
        },
        SortColumn {
            field: "updated_at",
            column: "updated_at",
            collation: Collation::Natural,
        },
    ],
    &[("created_at", SortDirection::Ascending)],
    "id",
);

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for todo persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TodoValidationError),
    Db(DbError),
    NotFound(TodoId),
    InvalidData(String),
    /// Caller-class query error (bad window, unknown sort field, bad filter,
    /// cancellation).
    Query(QueryError),
    /// Connection has not run migrations up to the supported version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
            Self::Query(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Query(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<QueryError> for RepoError {
    fn from(value: QueryError) -> Self {
        match value {
            QueryError::Storage(err) => Self::Db(err),
            QueryError::InvalidRow(message) => Self::InvalidData(message),
            other => Self::Query(other),
        }
    }
}

/// Query options for the plain CRUD listing.
#[derive(Debug, Clone, Default)]
pub struct TodoListQuery {
    pub status: Option<TodoStatus>,
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Search filter for the paged todo search.
///
/// Opaque to the query engine; [`translate_todo_filter`] turns it into a
/// SQL predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoSearchFilter {
    /// Matches any of the given statuses; empty means no restriction.
    pub statuses: Vec<TodoStatus>,
    /// Case-insensitive substring match on the name.
    pub name_contains: Option<String>,
    /// Inclusive creation-time lower bound, epoch milliseconds.
    pub created_from: Option<i64>,
    /// Inclusive creation-time upper bound, epoch milliseconds.
    pub created_to: Option<i64>,
}

/// Repository interface for todo CRUD and search operations.
pub trait TodoRepository {
    fn create_todo(&self, todo: &TodoItem) -> RepoResult<TodoId>;
    fn update_todo(&self, todo: &TodoItem) -> RepoResult<()>;
    fn get_todo(&self, id: TodoId, include_deleted: bool) -> RepoResult<Option<TodoItem>>;
    fn list_todos(&self, query: &TodoListQuery) -> RepoResult<Vec<TodoItem>>;
    fn soft_delete_todo(&self, id: TodoId) -> RepoResult<()>;
    /// Paged search over non-deleted todos.
    fn search_todos(
        &self,
        request: &PageRequest<TodoSearchFilter>,
        cancel: &CancelToken,
    ) -> RepoResult<PageResult<TodoItem>>;
}

/// SQLite-backed todo repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
    audit: AuditStamp,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Constructs a repository after verifying the connection is migrated
    /// and the `todos` table has the required shape.
    pub fn try_new(conn: &'conn Connection, audit: AuditStamp) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn, audit })
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn create_todo(&self, todo: &TodoItem) -> RepoResult<TodoId> {
        todo.validate()?;

        self.conn.execute(
            "INSERT INTO todos (id, name, status, is_deleted)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                todo.id.to_string(),
                todo.name.as_str(),
                status_to_db(todo.status),
                bool_to_int(todo.is_deleted),
            ],
        )?;

        Ok(todo.id)
    }

    fn update_todo(&self, todo: &TodoItem) -> RepoResult<()> {
        todo.validate()?;

        let changed = self.conn.execute(
            "UPDATE todos
             SET
                name = ?1,
                status = ?2,
                is_deleted = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?4;",
            params![
                todo.name.as_str(),
                status_to_db(todo.status),
                bool_to_int(todo.is_deleted),
                todo.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(todo.id));
        }

        Ok(())
    }

    fn get_todo(&self, id: TodoId, include_deleted: bool) -> RepoResult<Option<TodoItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TODO_SELECT_SQL}
             WHERE id = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_todo_row(row)?));
        }

        Ok(None)
    }

    fn list_todos(&self, query: &TodoListQuery) -> RepoResult<Vec<TodoItem>> {
        let mut sql = format!("{TODO_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND is_deleted = 0");
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status_to_db(status).to_string()));
        }

        sql.push_str(" ORDER BY created_at ASC, id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut todos = Vec::new();

        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }

        Ok(todos)
    }

    fn soft_delete_todo(&self, id: TodoId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE todos
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn search_todos(
        &self,
        request: &PageRequest<TodoSearchFilter>,
        cancel: &CancelToken,
    ) -> RepoResult<PageResult<TodoItem>> {
        let started_at = Instant::now();

        // One read transaction so count and slice observe the same snapshot.
        let tx = self.conn.unchecked_transaction()?;
        let source = SqliteSource::new(
            &tx,
            "todos",
            TODO_SELECT_SQL,
            Some("is_deleted = 0"),
            translate_todo_filter,
            parse_todo_row_for_query,
        );

        let result = get_page(&source, &TODO_SORT_FIELDS, request, cancel);
        drop(source);
        tx.commit()?;

        match result {
            Ok(page) => {
                info!(
                    "event=todo_search module=repo status=ok actor={} page_index={} page_size={} items={} total={} duration_ms={}",
                    self.audit.actor(),
                    page.page_index,
                    page.page_size,
                    page.items.len(),
                    page.total.map_or_else(|| "none".to_string(), |total| total.to_string()),
                    started_at.elapsed().as_millis()
                );
                Ok(page)
            }
            Err(err) => {
                error!(
                    "event=todo_search module=repo status=error actor={} page_index={} page_size={} duration_ms={} error={}",
                    self.audit.actor(),
                    request.page_index,
                    request.page_size,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }
}

/// Translates a [`TodoSearchFilter`] into a SQL predicate.
///
/// An empty status set and absent text/range bounds place no restriction.
fn translate_todo_filter(filter: &TodoSearchFilter) -> QueryResult<SqlPredicate> {
    let mut predicate = SqlPredicate::default();

    if !filter.statuses.is_empty() {
        let placeholders = vec!["?"; filter.statuses.len()].join(", ");
        predicate.push(
            &format!("status IN ({placeholders})"),
            filter
                .statuses
                .iter()
                .map(|status| Value::Text(status_to_db(*status).to_string())),
        );
    }

    if let Some(pattern) = filter.name_contains.as_deref() {
        let trimmed = pattern.trim();
        if !trimmed.is_empty() {
            predicate.push(
                "name LIKE ? ESCAPE '\\'",
                [Value::Text(format!("%{}%", escape_like_pattern(trimmed)))],
            );
        }
    }

    if let (Some(from), Some(to)) = (filter.created_from, filter.created_to) {
        if from > to {
            return Err(QueryError::InvalidFilter(format!(
                "created_from ({from}) must not be after created_to ({to})"
            )));
        }
    }
    if let Some(from) = filter.created_from {
        predicate.push("created_at >= ?", [Value::Integer(from)]);
    }
    if let Some(to) = filter.created_to {
        predicate.push("created_at <= ?", [Value::Integer(to)]);
    }

    Ok(predicate)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "todos")? {
        return Err(RepoError::MissingRequiredTable("todos"));
    }

    for column in REQUIRED_TODO_COLUMNS {
        let present: i64 = conn.query_row(
            "SELECT COUNT(*) FROM pragma_table_info('todos') WHERE name = ?1;",
            [column],
            |row| row.get(0),
        )?;
        if present == 0 {
            return Err(RepoError::MissingRequiredColumn {
                table: "todos",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
         );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_todo_row_for_query(row: &Row<'_>) -> QueryResult<TodoItem> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| QueryError::InvalidRow(format!("invalid uuid value `{id_text}` in todos.id")))?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        QueryError::InvalidRow(format!("invalid status `{status_text}` in todos.status"))
    })?;

    let is_deleted = match row.get::<_, i64>("is_deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(QueryError::InvalidRow(format!(
                "invalid is_deleted value `{other}` in todos.is_deleted"
            )));
        }
    };

    let todo = TodoItem {
        id,
        name: row.get("name")?,
        status,
        is_deleted,
    };
    todo.validate()
        .map_err(|err| QueryError::InvalidRow(err.to_string()))?;
    Ok(todo)
}

fn parse_todo_row(row: &Row<'_>) -> RepoResult<TodoItem> {
    parse_todo_row_for_query(row).map_err(Into::into)
}

fn status_to_db(status: TodoStatus) -> &'static str {
    match status {
        TodoStatus::Created => "created",
        TodoStatus::InProgress => "in_progress",
        TodoStatus::Completed => "completed",
        TodoStatus::Cancelled => "cancelled",
    }
}

fn parse_status(value: &str) -> Option<TodoStatus> {
    match value {
        "created" => Some(TodoStatus::Created),
        "in_progress" => Some(TodoStatus::InProgress),
        "completed" => Some(TodoStatus::Completed),
        "cancelled" => Some(TodoStatus::Cancelled),
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
