//! Completion API boundary.

pub mod http;
pub mod openai;

use async_trait::async_trait;

use crate::config::ConvoConfig;
use crate::error::ConvoError;
use crate::types::{Message, Usage};

/// Normalized result of one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    /// `None` when the API reported no usage block at all.
    pub usage: Option<Usage>,
}

/// The hosted chat completion API.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &str;

    /// Run one completion over `messages` with the given model id.
    async fn complete(&self, model: &str, messages: &[Message])
        -> Result<Completion, ConvoError>;
}

/// Text embedding endpoint, used by the vector log.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, ConvoError>;
}

/// Stand-in used when no credentials are configured.
///
/// Every call fails with [`ConvoError::Authentication`], so storage-only
/// operations keep working without an API key.
#[derive(Debug, Clone)]
pub struct UnavailableProvider {
    reason: String,
}

impl UnavailableProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl CompletionProvider for UnavailableProvider {
    fn provider_name(&self) -> &str {
        "unavailable"
    }

    async fn complete(&self, _model: &str, _messages: &[Message]) -> Result<Completion, ConvoError> {
        Err(ConvoError::Authentication(self.reason.clone()))
    }
}

/// Build the OpenAI provider from config.
pub fn create_provider(config: &ConvoConfig) -> Result<openai::OpenAiProvider, ConvoError> {
    let api_key = config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ConvoError::Authentication("Missing OPENAI_API_KEY".into()))?;
    Ok(openai::OpenAiProvider::new(api_key, config.base_url.clone()))
}
