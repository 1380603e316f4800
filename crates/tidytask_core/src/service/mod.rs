//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep embedding layers decoupled from storage details.

pub mod todo_service;
