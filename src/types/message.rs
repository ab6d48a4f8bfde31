//! Message types for conversation turns.

use serde::{Deserialize, Serialize};

use super::usage::Usage;

/// One turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Token counts reported by the completion API. Assistant messages only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl Message {
    /// Create a system message. Never stored; used when composing a request.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: text.into(),
            usage: None,
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
            usage: None,
        }
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>, usage: Option<Usage>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
            usage,
        }
    }
}

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}
