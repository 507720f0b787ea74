//! Session domain model.
//!
//! This module contains the core Session entity that represents
//! a named conversation in the application's domain layer.

use super::message::ConversationMessage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named conversation: an ordered, append-only message log with a
/// user-editable title.
///
/// Session ids are unique for the process lifetime. Messages preserve
/// insertion order; no reordering operation exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Human-readable session title
    pub title: String,
    /// Timestamp when the session was created (ISO 8601 format)
    pub created_at: String,
    /// Timestamp when the session was last updated (ISO 8601 format)
    pub updated_at: String,
    /// Ordered conversation history
    #[serde(default)]
    pub messages: Vec<ConversationMessage>,
}

impl Session {
    /// Creates an empty session with a fresh id, timestamped now.
    pub fn new(title: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            created_at: now.clone(),
            updated_at: now,
            messages: Vec::new(),
        }
    }

    /// Refreshes the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_has_unique_id() {
        let a = Session::new("A");
        let b = Session::new("B");
        assert_ne!(a.id, b.id);
        assert!(a.messages.is_empty());
        assert_eq!(a.created_at, a.updated_at);
    }

    #[test]
    fn test_deserialize_defaults_messages() {
        let toml_like = r#"{"id":"x","title":"t","created_at":"c","updated_at":"u"}"#;
        let session: Session = serde_json::from_str(toml_like).unwrap();
        assert!(session.messages.is_empty());
    }
}
