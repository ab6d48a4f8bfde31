//! Durable storage for conversation documents and the current pointer.

pub mod file;

pub use file::{FileConversationStore, StoreConfig};

use crate::error::ConvoError;
use crate::types::Conversation;

/// Storage abstraction for persisted conversations.
///
/// There is no caching layer: every read goes back to storage and every
/// write is durable before the call returns.
pub trait ConversationStore: Send + Sync {
    /// Load a conversation. Fails with [`ConvoError::NotFound`] when absent.
    fn load(&self, id: u64) -> Result<Conversation, ConvoError>;

    /// Replace the stored document for `conversation.id`.
    fn save(&self, conversation: &Conversation) -> Result<(), ConvoError>;

    /// Whether a document exists for `id`.
    fn exists(&self, id: u64) -> Result<bool, ConvoError>;

    /// Ids of every stored document, ascending.
    fn list_ids(&self) -> Result<Vec<u64>, ConvoError>;

    /// The persisted current pointer. Initialized to `1` when absent.
    fn current_id(&self) -> Result<u64, ConvoError>;

    /// Replace the persisted current pointer.
    fn set_current_id(&self, id: u64) -> Result<(), ConvoError>;
}
