//! Todo item domain model.
//!
//! # Responsibility
//! - Define the canonical todo record and its lifecycle states.
//! - Validate records before they reach persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another record.
//! - `is_deleted` is the source of truth for tombstone state.
//! - `name` is non-blank and at most [`NAME_MAX_CHARS`] characters.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Maximum accepted length of a todo name, in characters.
pub const NAME_MAX_CHARS: usize = 200;

/// Stable identifier for a todo record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TodoId = Uuid;

/// Lifecycle state of a todo item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    /// Captured but not started.
    Created,
    /// Work is in progress.
    InProgress,
    /// Completed successfully.
    Completed,
    /// No longer actionable.
    Cancelled,
}

/// Validation error for todo records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    /// The nil UUID is reserved and never a valid identity.
    NilId,
    /// Name is empty or whitespace-only.
    BlankName,
    /// Name exceeds [`NAME_MAX_CHARS`] characters.
    NameTooLong { length: usize, max: usize },
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "todo id must not be the nil uuid"),
            Self::BlankName => write!(f, "todo name must not be blank"),
            Self::NameTooLong { length, max } => {
                write!(f, "todo name length {length} exceeds maximum {max}")
            }
        }
    }
}

impl Error for TodoValidationError {}

/// Canonical todo record.
///
/// Creation/update timestamps live in storage only; read models that need
/// them carry them explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Stable global ID used for linking and auditing.
    pub id: TodoId,
    /// Short human-readable description.
    pub name: String,
    /// Current lifecycle state.
    pub status: TodoStatus,
    /// Soft delete tombstone; deleted rows stay queryable on request.
    pub is_deleted: bool,
}

impl TodoItem {
    /// Creates a new todo with a generated stable ID and `Created` status.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status: TodoStatus::Created,
            is_deleted: false,
        }
    }

    /// Creates a todo with a caller-provided stable ID.
    ///
    /// Used by import paths where identity already exists externally.
    /// Rejects the nil UUID; other validation runs at persistence time.
    pub fn with_id(
        id: TodoId,
        name: impl Into<String>,
        status: TodoStatus,
    ) -> Result<Self, TodoValidationError> {
        if id.is_nil() {
            return Err(TodoValidationError::NilId);
        }
        Ok(Self {
            id,
            name: name.into(),
            status,
            is_deleted: false,
        })
    }

    /// Checks record-level invariants.
    ///
    /// # Errors
    /// - [`TodoValidationError::NilId`] for a nil identity.
    /// - [`TodoValidationError::BlankName`] for an empty or blank name.
    /// - [`TodoValidationError::NameTooLong`] when the name exceeds the cap.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.id.is_nil() {
            return Err(TodoValidationError::NilId);
        }
        if self.name.trim().is_empty() {
            return Err(TodoValidationError::BlankName);
        }
        let length = self.name.chars().count();
        if length > NAME_MAX_CHARS {
            return Err(TodoValidationError::NameTooLong {
                length,
                max: NAME_MAX_CHARS,
            });
        }
        Ok(())
    }

    /// Marks this record as softly deleted (tombstoned).
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    /// Clears the soft delete flag.
    pub fn restore(&mut self) {
        self.is_deleted = false;
    }

    /// Returns whether this record should be considered visible/active.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}
