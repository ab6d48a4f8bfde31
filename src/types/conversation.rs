//! The persisted conversation document.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::message::{Message, Role};

/// A persisted, identified sequence of chat turns plus its configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Conversation {
    pub id: u64,
    pub name: String,
    /// System instruction prepended to every completion request.
    #[serde(rename = "chatbot_personality")]
    pub personality: String,
    pub model: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Build an empty conversation named from `name_template`.
    ///
    /// Every `{id}` in the template is replaced with the conversation id.
    pub fn new(
        id: u64,
        name_template: &str,
        personality: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name_template.replace("{id}", &id.to_string()),
            personality: personality.into(),
            model: model.into(),
            messages: Vec::new(),
        }
    }

    /// Label used when forwarding exchanges to the vector log.
    pub fn log_label(&self) -> String {
        format!("Conv{}", self.id)
    }

    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }

    /// Plain-text transcript, one `role: content` block per message.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.name);
        let _ = writeln!(out, "model: {}", self.model);
        for msg in self.messages.iter().filter(|m| m.role != Role::System) {
            let _ = write!(out, "\n{}: {}\n", msg.role, msg.content);
        }
        out
    }
}

/// `(id, name)` pair returned when enumerating stored conversations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: u64,
    pub name: String,
}
