//! Todo use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD and search entry points for core callers.
//! - Project stored records into the caller-facing [`TodoItemDto`] shape.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::todo::{TodoId, TodoItem, TodoStatus};
use crate::query::engine::CancelToken;
use crate::query::page::{PageRequest, PageResult};
use crate::repo::todo_repo::{
    RepoError, RepoResult, TodoListQuery, TodoRepository, TodoSearchFilter,
};
use serde::{Deserialize, Serialize};

/// Caller-facing projection of a todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItemDto {
    pub id: TodoId,
    pub name: String,
    pub status: TodoStatus,
}

impl From<TodoItem> for TodoItemDto {
    fn from(value: TodoItem) -> Self {
        Self {
            id: value.id,
            name: value.name,
            status: value.status,
        }
    }
}

/// Use-case service wrapper for todo operations.
pub struct TodoService<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a todo in `Created` state and returns its stable ID.
    pub fn create_todo(&self, name: impl Into<String>) -> RepoResult<TodoId> {
        let todo = TodoItem::new(name);
        self.repo.create_todo(&todo)
    }

    /// Updates an existing todo by stable ID.
    ///
    /// Returns repository-level not-found or validation errors unchanged.
    pub fn update_todo(&self, todo: &TodoItem) -> RepoResult<()> {
        self.repo.update_todo(todo)
    }

    /// Moves a todo to the given lifecycle state.
    pub fn set_status(&self, id: TodoId, status: TodoStatus) -> RepoResult<()> {
        let mut todo = self
            .repo
            .get_todo(id, false)?
            .ok_or(RepoError::NotFound(id))?;
        todo.status = status;
        self.repo.update_todo(&todo)
    }

    /// Gets one todo by ID with optional deleted-row visibility.
    pub fn get_todo(&self, id: TodoId, include_deleted: bool) -> RepoResult<Option<TodoItem>> {
        self.repo.get_todo(id, include_deleted)
    }

    /// Lists todos using filter and pagination options.
    pub fn list_todos(&self, query: &TodoListQuery) -> RepoResult<Vec<TodoItem>> {
        self.repo.list_todos(query)
    }

    /// Soft-deletes a todo by ID.
    pub fn soft_delete_todo(&self, id: TodoId) -> RepoResult<()> {
        self.repo.soft_delete_todo(id)
    }

    /// Paged search returning caller-facing DTOs.
    pub fn search_todos(
        &self,
        request: &PageRequest<TodoSearchFilter>,
        cancel: &CancelToken,
    ) -> RepoResult<PageResult<TodoItemDto>> {
        let page = self.repo.search_todos(request, cancel)?;
        Ok(page.map(TodoItemDto::from))
    }
}
