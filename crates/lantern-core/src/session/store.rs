use super::message::ConversationMessage;
use super::model::Session;
use crate::error::{LanternError, Result};

/// Manages the set of named conversations and their lifecycle.
///
/// `ConversationStore` is responsible for:
/// - Creating new sessions (inserted at the front of the list)
/// - Switching between sessions
/// - Deleting and renaming sessions
/// - Appending messages to a session's log
/// - Tracking the active session and the currently displayed log
///
/// The displayed log mirrors the active session's messages but is a separate
/// piece of state: selecting a session replaces it, deleting the active
/// session clears it, and messages sent while no session is active appear
/// only there.
#[derive(Debug, Default)]
pub struct ConversationStore {
    /// All sessions, most recently created first.
    sessions: Vec<Session>,
    /// Id of the active session, if any. Always references a present session.
    active_id: Option<String>,
    /// The message log currently shown to the user.
    displayed: Vec<ConversationMessage>,
}

impl ConversationStore {
    /// Creates an empty store with no sessions and no active session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new session titled "New Chat N", inserts it at the front of
    /// the session list, makes it active, and clears the displayed log.
    ///
    /// N is one more than the number of sessions already in the store, so
    /// titles may repeat after deletions; ids never do.
    ///
    /// # Returns
    ///
    /// The id of the new session. Never fails.
    pub fn create_session(&mut self) -> String {
        let title = format!("New Chat {}", self.sessions.len() + 1);
        let session = Session::new(title);
        let id = session.id.clone();

        self.sessions.insert(0, session);
        self.active_id = Some(id.clone());
        self.displayed.clear();

        id
    }

    /// Makes the given session active and loads its messages into the
    /// displayed log. Session data is not mutated.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no session has the given id.
    pub fn select_session(&mut self, id: &str) -> Result<()> {
        let session = self
            .session(id)
            .ok_or_else(|| LanternError::not_found("session", id))?;

        self.displayed = session.messages.clone();
        self.active_id = Some(id.to_string());

        Ok(())
    }

    /// Removes the session with the given id.
    ///
    /// If it was the active session, the active pointer and the displayed
    /// log are cleared. Deleting an id that is not present is a no-op, so
    /// repeated deletes are idempotent.
    ///
    /// # Returns
    ///
    /// `true` if a session was actually removed.
    pub fn delete_session(&mut self, id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);

        if self.sessions.len() == before {
            return false;
        }

        if self.active_id.as_deref() == Some(id) {
            self.active_id = None;
            self.displayed.clear();
        }

        true
    }

    /// Renames a session by updating its title.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the new title is empty or whitespace-only
    /// (the stored title is untouched; an empty title is never stored), and
    /// `NotFound` if no session has the given id.
    pub fn rename_session(&mut self, id: &str, new_title: &str) -> Result<()> {
        let trimmed = new_title.trim();
        if trimmed.is_empty() {
            return Err(LanternError::invalid_input("session title must not be blank"));
        }

        let session = self
            .session_mut(id)
            .ok_or_else(|| LanternError::not_found("session", id))?;

        session.title = trimmed.to_string();
        session.touch();

        Ok(())
    }

    /// Appends a message to the session's log; if the session is active, the
    /// displayed log is updated as well. Messages are append-only and keep
    /// insertion order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no session has the given id.
    pub fn append_message(&mut self, id: &str, message: ConversationMessage) -> Result<()> {
        let is_active = self.active_id.as_deref() == Some(id);

        let session = self
            .session_mut(id)
            .ok_or_else(|| LanternError::not_found("session", id))?;

        session.messages.push(message.clone());
        session.touch();

        if is_active {
            self.displayed.push(message);
        }

        Ok(())
    }

    /// Appends a message to the displayed log only.
    ///
    /// Used when a message is exchanged while no session is active: it is
    /// shown to the user but not recorded in any session.
    pub fn append_displayed(&mut self, message: ConversationMessage) {
        self.displayed.push(message);
    }

    /// Returns the last `limit` messages of the displayed log, oldest first.
    ///
    /// This is the context window handed to the answer-retrieval collaborator.
    pub fn recent_history(&self, limit: usize) -> Vec<ConversationMessage> {
        let start = self.displayed.len().saturating_sub(limit);
        self.displayed[start..].to_vec()
    }

    /// All sessions, most recently created first.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// The session with the given id, if present.
    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    fn session_mut(&mut self, id: &str) -> Option<&mut Session> {
        self.sessions.iter_mut().find(|s| s.id == id)
    }

    /// Id of the active session, if any.
    pub fn active_session_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// The message log currently shown to the user.
    pub fn displayed(&self) -> &[ConversationMessage] {
        &self.displayed
    }
}
