//! Core domain logic for TidyTask.
//! This crate is the single source of truth for business invariants and for
//! the paged query engine the todo use-cases are built on.

pub mod audit;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use audit::AuditStamp;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::todo::{TodoId, TodoItem, TodoStatus, TodoValidationError};
pub use query::{
    get_page, CancelToken, Collation, PageRequest, PageResult, PageSource, QueryError,
    QueryResult, ResolvedSort, SortColumn, SortDirection, SortKey, SortRegistry,
};
pub use repo::todo_repo::{
    RepoError, RepoResult, SqliteTodoRepository, TodoListQuery, TodoRepository, TodoSearchFilter,
    TODO_SORT_FIELDS,
};
pub use service::todo_service::{TodoItemDto, TodoService};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
