//! Enumerating, creating and switching conversations.

use std::sync::Arc;

use tracing::info;

use crate::error::ConvoError;
use crate::store::ConversationStore;
use crate::types::{Conversation, ConversationSummary};

/// Defaults applied to conversations the registry materializes itself.
#[derive(Debug, Clone)]
pub struct ConversationDefaults {
    /// Placeholder name; `{id}` is replaced with the conversation id.
    pub name_template: String,
    pub personality: String,
    pub model: String,
}

impl Default for ConversationDefaults {
    fn default() -> Self {
        Self {
            name_template: crate::config::DEFAULT_NAME_TEMPLATE.to_string(),
            personality: crate::config::DEFAULT_PERSONALITY.to_string(),
            model: crate::models::DEFAULT_MODEL.to_string(),
        }
    }
}

/// Conversation directory on top of a [`ConversationStore`].
///
/// Single-process, single-user: id allocation is `max + 1` with no locking.
#[derive(Clone)]
pub struct ConversationRegistry {
    store: Arc<dyn ConversationStore>,
    defaults: ConversationDefaults,
}

impl std::fmt::Debug for ConversationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationRegistry")
            .field("store", &"..")
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl ConversationRegistry {
    pub fn new(store: Arc<dyn ConversationStore>, defaults: ConversationDefaults) -> Self {
        Self { store, defaults }
    }

    pub fn store(&self) -> &Arc<dyn ConversationStore> {
        &self.store
    }

    pub fn defaults(&self) -> &ConversationDefaults {
        &self.defaults
    }

    /// Every stored conversation as `(id, name)`, ascending by id.
    pub fn list_all(&self) -> Result<Vec<ConversationSummary>, ConvoError> {
        self.store
            .list_ids()?
            .into_iter()
            .map(|id| self.store.load(id).map(|c| c.summary()))
            .collect()
    }

    /// Create, persist and select a new empty conversation with id `max + 1`.
    pub fn create_new(
        &self,
        name_template: &str,
        personality: &str,
    ) -> Result<Conversation, ConvoError> {
        let next_id = self.store.list_ids()?.into_iter().max().unwrap_or(0) + 1;
        self.materialize(next_id, name_template, personality)
    }

    /// Create a conversation from the registry defaults.
    pub fn create_default(&self) -> Result<Conversation, ConvoError> {
        let name_template = self.defaults.name_template.clone();
        let personality = self.defaults.personality.clone();
        self.create_new(&name_template, &personality)
    }

    /// Load the current conversation, creating it when the pointer dangles.
    ///
    /// On an empty store the pointer's own id is created, so a first run
    /// yields conversation 1. With other documents present a fresh id is
    /// allocated and the pointer is moved to it.
    pub fn ensure_current_exists(&self) -> Result<Conversation, ConvoError> {
        let current = self.store.current_id()?;
        if self.store.exists(current)? {
            return self.store.load(current);
        }

        let name_template = self.defaults.name_template.clone();
        let personality = self.defaults.personality.clone();
        if self.store.list_ids()?.is_empty() {
            self.materialize(current, &name_template, &personality)
        } else {
            self.create_new(&name_template, &personality)
        }
    }

    /// Make `id` the current conversation.
    pub fn switch_to(&self, id: u64) -> Result<Conversation, ConvoError> {
        let conversation = self.store.load(id)?;
        self.store.set_current_id(id)?;
        info!(id, "switched conversation");
        Ok(conversation)
    }

    fn materialize(
        &self,
        id: u64,
        name_template: &str,
        personality: &str,
    ) -> Result<Conversation, ConvoError> {
        let conversation =
            Conversation::new(id, name_template, personality, self.defaults.model.clone());
        self.store.save(&conversation)?;
        self.store.set_current_id(id)?;
        info!(id, name = %conversation.name, "created conversation");
        Ok(conversation)
    }
}
