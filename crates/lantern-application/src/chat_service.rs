//! Chat use case implementation.
//!
//! `ChatService` coordinates the `ConversationStore` with the assistant
//! backend: it appends the user's message, gathers conversational context,
//! drives the remote retrieval-augmented chat call, and appends the reply.
//! Remote failures never escape as errors; they surface as an assistant
//! message saying the backend could not be reached.

use std::sync::Arc;

use lantern_core::clipboard::ClipboardAggregator;
use lantern_core::error::{LanternError, Result};
use lantern_core::session::{ConversationMessage, ConversationStore, MessageRole, Session};
use lantern_interaction::{AssistantBackend, ChatOptions, LlmProvider};
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Number of displayed-log messages sent as context with each chat call.
const HISTORY_WINDOW: usize = 10;

/// Reply shown in place of an answer when the backend cannot be reached.
const CONTACT_FAILURE_REPLY: &str =
    "Failed to contact the assistant backend. Please check that the server is running.";

/// What happened to a submitted chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// An assistant message was appended; carries its content (the answer
    /// or a failure notice).
    Replied(String),
    /// The input was blank; nothing was sent and nothing changed.
    Ignored,
    /// The in-flight call was cancelled; no reply was appended.
    Cancelled,
}

/// Use case for conversations with the assistant backend.
///
/// Sends are serialized by an internal lock, so overlapping calls queue up
/// and replies append in send order. Every remote call races against the
/// service's cancellation token, which `cancel_inflight` trips on shutdown.
pub struct ChatService {
    /// Conversation state shared with the caller.
    store: Arc<RwLock<ConversationStore>>,
    /// Snippets harvested from assistant replies.
    clipboard: Arc<RwLock<ClipboardAggregator>>,
    /// Remote collaborator answering queries.
    backend: Arc<dyn AssistantBackend>,
    /// Per-call query options, shared with the export flow.
    options: Arc<RwLock<ChatOptions>>,
    /// Serializes sends so replies append in send order.
    send_lock: Mutex<()>,
    /// Trips on shutdown to abandon an in-flight send.
    cancel_token: CancellationToken,
}

impl ChatService {
    /// Creates a new `ChatService`.
    ///
    /// # Arguments
    ///
    /// * `backend` - Remote collaborator for chat calls
    /// * `options` - Shared chat options (dataset, provider, model, top_k)
    /// * `clipboard` - Shared clipboard receiving harvested replies
    pub fn new(
        backend: Arc<dyn AssistantBackend>,
        options: Arc<RwLock<ChatOptions>>,
        clipboard: Arc<RwLock<ClipboardAggregator>>,
    ) -> Self {
        Self {
            store: Arc::new(RwLock::new(ConversationStore::new())),
            clipboard,
            backend,
            options,
            send_lock: Mutex::new(()),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Sends a user message to the assistant and appends the reply.
    ///
    /// Blank input is ignored without touching the store. The message goes
    /// into the active session when one exists, otherwise only into the
    /// displayed log. Context is the displayed log as it stood before this
    /// message, capped at the last ten entries; the backend appends the
    /// current query itself.
    ///
    /// # Errors
    ///
    /// Remote failures do not error: they append a contact-failure reply.
    /// Only store-level failures (a session vanishing mid-append) propagate.
    pub async fn send_user_message(&self, text: &str) -> Result<SendOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        let _guard = self.send_lock.lock().await;

        let (history, target) = {
            let mut store = self.store.write().await;
            let history = store.recent_history(HISTORY_WINDOW);
            let target = store.active_session_id().map(str::to_string);

            match &target {
                Some(id) => store.append_message(id, ConversationMessage::user(text))?,
                None => store.append_displayed(ConversationMessage::user(text)),
            }
            (history, target)
        };

        let options = self.options.read().await.clone();
        debug!(
            "[ChatService] Sending query to dataset '{}' with {} history messages",
            options.dataset,
            history.len()
        );

        let reply = tokio::select! {
            result = self.backend.chat(&options, text, &history) => result,
            _ = self.cancel_token.cancelled() => {
                warn!("[ChatService] Send cancelled before a reply arrived");
                return Ok(SendOutcome::Cancelled);
            }
        };

        let content = match reply {
            Ok(answer) => answer,
            Err(e) => {
                error!("[ChatService] Chat call failed: {}", e);
                CONTACT_FAILURE_REPLY.to_string()
            }
        };

        let mut store = self.store.write().await;
        match target {
            // The session may have been deleted while the call was in flight
            Some(id) if store.session(&id).is_some() => {
                store.append_message(&id, ConversationMessage::assistant(content.clone()))?;
            }
            _ => store.append_displayed(ConversationMessage::assistant(content.clone())),
        }

        Ok(SendOutcome::Replied(content))
    }

    /// Abandons any in-flight send. Used on shutdown.
    pub fn cancel_inflight(&self) {
        self.cancel_token.cancel();
    }

    // ===== Session operations =====

    /// Creates a new chat session and makes it active.
    pub async fn new_chat(&self) -> String {
        let id = self.store.write().await.create_session();
        info!("[ChatService] Created session: {}", id);
        id
    }

    /// Switches to the given session, loading its log for display.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no session has the given id.
    pub async fn select_chat(&self, id: &str) -> Result<()> {
        self.store.write().await.select_session(id)
    }

    /// Deletes the given session. Returns `true` if it existed.
    pub async fn delete_chat(&self, id: &str) -> bool {
        let deleted = self.store.write().await.delete_session(id);
        if deleted {
            info!("[ChatService] Deleted session: {}", id);
        }
        deleted
    }

    /// Renames the given session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank title, `NotFound` for a missing id.
    pub async fn rename_chat(&self, id: &str, title: &str) -> Result<()> {
        self.store.write().await.rename_session(id, title)
    }

    /// All sessions, most recently created first.
    pub async fn sessions(&self) -> Vec<Session> {
        self.store.read().await.sessions().to_vec()
    }

    /// The message log currently shown to the user.
    pub async fn displayed(&self) -> Vec<ConversationMessage> {
        self.store.read().await.displayed().to_vec()
    }

    /// Id of the active session, if any.
    pub async fn active_session_id(&self) -> Option<String> {
        self.store.read().await.active_session_id().map(str::to_string)
    }

    /// Copies an assistant reply from the displayed log into the clipboard.
    ///
    /// With `index` unset, the most recent assistant reply is taken.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the index is out of range or no assistant
    /// reply exists, `InvalidInput` when the indexed message is not an
    /// assistant reply.
    ///
    /// # Returns
    ///
    /// The copied snippet text.
    pub async fn copy_reply_to_clipboard(&self, index: Option<usize>) -> Result<String> {
        let content = {
            let store = self.store.read().await;
            let displayed = store.displayed();

            let message = match index {
                Some(i) => displayed
                    .get(i)
                    .ok_or_else(|| LanternError::not_found("message", i.to_string()))?,
                None => displayed
                    .iter()
                    .rev()
                    .find(|m| m.role == MessageRole::Assistant)
                    .ok_or_else(|| LanternError::not_found("assistant reply", "latest"))?,
            };

            if message.role != MessageRole::Assistant {
                return Err(LanternError::invalid_input(
                    "only assistant replies can be copied to the clipboard",
                ));
            }
            message.content.clone()
        };

        self.clipboard.write().await.add_item(content.clone());
        info!("[ChatService] Copied reply to clipboard ({} chars)", content.len());
        Ok(content)
    }

    // ===== Chat options =====

    /// Current query options.
    pub async fn options(&self) -> ChatOptions {
        self.options.read().await.clone()
    }

    /// Sets the dataset queried for context.
    pub async fn set_dataset(&self, dataset: impl Into<String>) {
        let dataset = dataset.into();
        info!("[ChatService] Dataset set to '{}'", dataset);
        self.options.write().await.dataset = dataset;
    }

    /// Sets the provider routing tag.
    pub async fn set_provider(&self, provider: LlmProvider) {
        info!("[ChatService] Provider set to '{}'", provider);
        self.options.write().await.provider = provider;
    }

    /// Sets the model name handed to the provider.
    pub async fn set_model(&self, model: impl Into<String>) {
        let model = model.into();
        info!("[ChatService] Model set to '{}'", model);
        self.options.write().await.model = model;
    }

    /// Sets the number of retrieval hits mixed into the prompt.
    pub async fn set_top_k(&self, top_k: u32) {
        info!("[ChatService] top_k set to {}", top_k);
        self.options.write().await.top_k = top_k;
    }
}
