//! Reply generation and topic derivation over a [`CompletionProvider`].

use std::sync::Arc;

use tracing::debug;

use crate::error::ConvoError;
use crate::provider::CompletionProvider;
use crate::types::{Message, Role};

/// Instruction used for the one-shot topic derivation call.
pub const TOPIC_INSTRUCTION: &str =
    "Give a short topic for this conversation in 3-5 words. Reply with the topic only.";

/// Composes requests and normalizes completions into stored messages.
///
/// Failures propagate unchanged: no retry, no backoff.
#[derive(Clone)]
pub struct ReplyService {
    provider: Arc<dyn CompletionProvider>,
    topic_model: String,
}

impl std::fmt::Debug for ReplyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyService")
            .field("provider", &self.provider.provider_name())
            .field("topic_model", &self.topic_model)
            .finish()
    }
}

impl ReplyService {
    pub fn new(provider: Arc<dyn CompletionProvider>, topic_model: impl Into<String>) -> Self {
        Self {
            provider,
            topic_model: topic_model.into(),
        }
    }

    /// Build `[system(personality), ..memory_window, user(prompt)]`.
    ///
    /// The window is passed through untouched.
    pub fn compose(prompt: &str, memory_window: &[Message], personality: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(memory_window.len() + 2);
        messages.push(Message::system(personality));
        messages.extend_from_slice(memory_window);
        messages.push(Message::user(prompt));
        messages
    }

    /// Request the assistant reply for `prompt`.
    pub async fn generate_reply(
        &self,
        prompt: &str,
        memory_window: &[Message],
        model: &str,
        personality: &str,
    ) -> Result<Message, ConvoError> {
        let messages = Self::compose(prompt, memory_window, personality);
        debug!(model, window = memory_window.len(), "generate_reply");
        let completion = self.provider.complete(model, &messages).await?;
        Ok(Message {
            role: Role::Assistant,
            content: completion.text,
            usage: completion.usage,
        })
    }

    /// Ask for a short topic label for `prompt`, truncated to `max_chars`.
    pub async fn derive_topic(&self, prompt: &str, max_chars: usize) -> Result<String, ConvoError> {
        let messages = [Message::system(TOPIC_INSTRUCTION), Message::user(prompt)];
        let completion = self.provider.complete(&self.topic_model, &messages).await?;
        Ok(truncate_label(completion.text.trim(), max_chars))
    }
}

/// Truncate to at most `max_chars` characters, then trim trailing space.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    label
        .chars()
        .take(max_chars)
        .collect::<String>()
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_orders_system_window_user() {
        let window = vec![Message::user("a"), Message::assistant("b", None)];
        let composed = ReplyService::compose("c", &window, "persona");
        let roles: Vec<Role> = composed.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(composed[0].content, "persona");
        assert_eq!(composed[3].content, "c");
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_label("Zażółć gęślą", 6), "Zażółć");
        assert_eq!(truncate_label("short", 50), "short");
        assert_eq!(truncate_label("two words", 4), "two");
    }
}
