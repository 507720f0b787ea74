//! Session domain module.
//!
//! This module contains all session-related domain models and the in-memory
//! store that manages them.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`)
//! - `message`: Conversation message types (`MessageRole`, `ConversationMessage`)
//! - `store`: Session lifecycle management (`ConversationStore`)

mod message;
mod model;
mod store;

// Re-export public API
pub use message::{ConversationMessage, MessageRole};
pub use model::Session;
pub use store::ConversationStore;
