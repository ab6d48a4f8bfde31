//! Convenience re-exports for common use.

pub use crate::config::ConvoConfig;
pub use crate::error::{ConvoError, ErrorKind, Result};
pub use crate::memory::MemoryMode;
pub use crate::models::ChatModel;
pub use crate::provider::{Completion, CompletionProvider};
pub use crate::registry::{ConversationDefaults, ConversationRegistry};
pub use crate::reply::ReplyService;
pub use crate::session::{SessionController, SessionOptions, TurnState};
pub use crate::store::{ConversationStore, FileConversationStore, StoreConfig};
pub use crate::types::{Conversation, ConversationSummary, Cost, Message, Role, Usage};
pub use crate::vector_log::{ExchangeRecorder, NoopRecorder};
