//! Actor stamp attached to repository instances for traceability.
//!
//! # Responsibility
//! - Carry the acting principal through persistence operations unchanged.
//!
//! # Invariants
//! - The stamp is opaque to the query engine; only log lines consume it.
//! - Actor text is sanitized so one stamp cannot span multiple log lines.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

const MAX_ACTOR_CHARS: usize = 120;

/// Opaque actor/context stamp for one repository instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStamp {
    actor: String,
    created_at_ms: i64,
}

impl AuditStamp {
    /// Creates a stamp for the given acting principal.
    pub fn new(actor: impl Into<String>) -> Self {
        let created_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as i64);
        Self {
            actor: sanitize_actor(&actor.into()),
            created_at_ms,
        }
    }

    /// Returns the sanitized actor name.
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Returns stamp creation time in epoch milliseconds.
    pub fn created_at_ms(&self) -> i64 {
        self.created_at_ms
    }
}

fn sanitize_actor(raw: &str) -> String {
    let normalized = raw.replace(['\n', '\r'], " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return "unknown".to_string();
    }
    trimmed.chars().take(MAX_ACTOR_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::AuditStamp;

    #[test]
    fn actor_is_trimmed_and_single_line() {
        let stamp = AuditStamp::new("  api\nworker  ");
        assert_eq!(stamp.actor(), "api worker");
    }

    #[test]
    fn blank_actor_falls_back_to_unknown() {
        let stamp = AuditStamp::new("   ");
        assert_eq!(stamp.actor(), "unknown");
    }
}
