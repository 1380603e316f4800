//! Domain model for the todo service.
//!
//! # Responsibility
//! - Define the canonical todo record used by repositories and services.
//! - Keep validation rules next to the data they protect.
//!
//! # Invariants
//! - Every record is identified by a stable `TodoId`.
//! - Deletion is represented by soft-delete tombstones, not hard delete.

pub mod todo;
