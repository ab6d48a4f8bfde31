//! Session orchestration: one interactive user driving one conversation.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::ConvoError;
use crate::memory::{self, MemoryMode};
use crate::models;
use crate::registry::ConversationRegistry;
use crate::reply::ReplyService;
use crate::types::{Conversation, ConversationSummary, Cost, Message};
use crate::vector_log::{ExchangeRecorder, NoopRecorder, StoredExchange};

/// Where the controller is within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    AwaitingReply,
}

/// Per-session knobs that are not part of the stored conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub memory_mode: MemoryMode,
    pub topic_max_chars: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            memory_mode: MemoryMode::default(),
            topic_max_chars: crate::config::DEFAULT_TOPIC_MAX_CHARS,
        }
    }
}

/// Owns the working copy of the current conversation and is the only
/// writer back to the store.
///
/// A turn is only persisted once its reply has arrived and been saved. When
/// the reply call or the save fails, the prompt stays visible in
/// [`SessionController::messages`] as a pending turn and is discarded by the
/// next [`SessionController::submit`].
pub struct SessionController {
    registry: ConversationRegistry,
    replies: ReplyService,
    recorder: Arc<dyn ExchangeRecorder>,
    conversation: Conversation,
    options: SessionOptions,
    state: TurnState,
    pending: bool,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("conversation", &self.conversation.id)
            .field("options", &self.options)
            .field("state", &self.state)
            .field("pending", &self.pending)
            .finish()
    }
}

impl SessionController {
    /// Open the current conversation, creating it on first run.
    pub fn open(
        registry: ConversationRegistry,
        replies: ReplyService,
        options: SessionOptions,
    ) -> Result<Self, ConvoError> {
        let conversation = registry.ensure_current_exists()?;
        debug!(id = conversation.id, "session opened");
        Ok(Self {
            registry,
            replies,
            recorder: Arc::new(NoopRecorder),
            conversation,
            options,
            state: TurnState::Idle,
            pending: false,
        })
    }

    /// Forward finished exchanges to `recorder`.
    pub fn with_recorder(mut self, recorder: Arc<dyn ExchangeRecorder>) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// The working message log, including a pending turn if any.
    pub fn messages(&self) -> &[Message] {
        &self.conversation.messages
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    /// Whether the last message is a user turn that was never committed.
    pub fn has_pending_turn(&self) -> bool {
        self.pending
    }

    pub fn memory_mode(&self) -> MemoryMode {
        self.options.memory_mode
    }

    pub fn set_memory_mode(&mut self, mode: MemoryMode) {
        self.options.memory_mode = mode;
    }

    /// Run one turn: append, name on first message, reply, persist, record.
    pub async fn submit(&mut self, prompt: &str) -> Result<Message, ConvoError> {
        if prompt.trim().is_empty() {
            return Err(ConvoError::InvalidArgument("prompt is empty".into()));
        }
        if self.pending {
            self.conversation.messages.pop();
            self.pending = false;
        }

        self.conversation.messages.push(Message::user(prompt));
        self.pending = true;
        self.state = TurnState::AwaitingReply;

        let result = self.complete_turn(prompt).await;
        self.state = TurnState::Idle;
        let reply = result?;

        let label = self.conversation.log_label();
        if let Err(err) = self.recorder.record(prompt, &reply.content, &label).await {
            warn!(error = %err, label = %label, "vector log record failed");
        }
        Ok(reply)
    }

    async fn complete_turn(&mut self, prompt: &str) -> Result<Message, ConvoError> {
        if self.conversation.messages.len() == 1 {
            self.derive_name(prompt).await;
        }

        // The window includes the just-appended prompt.
        let window = memory::select(&self.conversation.messages, self.options.memory_mode);
        let reply = self
            .replies
            .generate_reply(
                prompt,
                window,
                &self.conversation.model,
                &self.conversation.personality,
            )
            .await?;

        // Commit to the working copy only once the document is on disk.
        let mut committed = self.conversation.clone();
        committed.messages.push(reply.clone());
        self.registry.store().save(&committed)?;

        self.conversation = committed;
        self.pending = false;
        Ok(reply)
    }

    async fn derive_name(&mut self, prompt: &str) {
        match self
            .replies
            .derive_topic(prompt, self.options.topic_max_chars)
            .await
        {
            Ok(label) if !label.is_empty() => {
                debug!(id = self.conversation.id, name = %label, "named conversation");
                self.conversation.name = label;
            }
            Ok(_) => warn!(id = self.conversation.id, "topic derivation returned nothing"),
            Err(err) => {
                warn!(id = self.conversation.id, error = %err, "topic derivation failed")
            }
        }
    }

    /// Replace the personality and persist immediately.
    pub fn set_personality(&mut self, personality: &str) -> Result<(), ConvoError> {
        if personality.trim().is_empty() {
            return Err(ConvoError::InvalidArgument("personality is empty".into()));
        }
        self.conversation.personality = personality.to_string();
        self.save_committed()
    }

    /// Replace the model id and persist immediately.
    pub fn set_model(&mut self, model: &str) -> Result<(), ConvoError> {
        let model = model.trim();
        if model.is_empty() {
            return Err(ConvoError::InvalidArgument("model is empty".into()));
        }
        self.conversation.model = model.to_string();
        self.save_committed()
    }

    /// Save without the pending turn, if there is one.
    fn save_committed(&self) -> Result<(), ConvoError> {
        if self.pending {
            let mut committed = self.conversation.clone();
            committed.messages.pop();
            self.registry.store().save(&committed)
        } else {
            self.registry.store().save(&self.conversation)
        }
    }

    /// Every stored conversation, ascending by id.
    pub fn list(&self) -> Result<Vec<ConversationSummary>, ConvoError> {
        self.registry.list_all()
    }

    /// Create a fresh conversation and make it the working copy.
    pub fn new_conversation(&mut self) -> Result<&Conversation, ConvoError> {
        self.conversation = self.registry.create_default()?;
        self.pending = false;
        Ok(&self.conversation)
    }

    /// Switch the working copy to another stored conversation.
    pub fn switch_to(&mut self, id: u64) -> Result<&Conversation, ConvoError> {
        self.conversation = self.registry.switch_to(id)?;
        self.pending = false;
        Ok(&self.conversation)
    }

    /// Running cost of the working copy, when its model has known pricing.
    pub fn running_cost(&self) -> Option<Cost> {
        models::pricing_for(&self.conversation.model)
            .map(|pricing| Cost::of_messages(&self.conversation.messages, pricing))
    }

    pub fn transcript(&self) -> String {
        self.conversation.transcript()
    }

    /// Write the transcript to `path`.
    pub fn export_to(&self, path: &Path) -> Result<(), ConvoError> {
        std::fs::write(path, self.transcript())?;
        Ok(())
    }

    /// Exchanges the vector log holds for this conversation.
    pub async fn logged_history(&self) -> Result<Vec<StoredExchange>, ConvoError> {
        self.recorder.history(&self.conversation.log_label()).await
    }
}
