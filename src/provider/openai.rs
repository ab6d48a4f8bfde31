//! OpenAI Chat Completions API provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::ConvoError;
use crate::types::{Message, Usage};

use super::http::{bearer_headers, shared_client, status_to_error};
use super::{Completion, CompletionProvider, EmbeddingProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_request_body(model: &str, messages: &[Message]) -> serde_json::Value {
        let messages = messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role.to_string(),
                    "content": m.content,
                })
            })
            .collect::<Vec<_>>();

        serde_json::json!({
            "model": model,
            "messages": messages,
        })
    }

    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<T, ConvoError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status.as_u16(), &body_text));
        }

        let raw = resp.text().await?;
        serde_json::from_str(&raw).map_err(|err| {
            ConvoError::api(status.as_u16(), format!("malformed response: {err}"))
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
    ) -> Result<Completion, ConvoError> {
        let body = Self::build_request_body(model, messages);
        debug!(model, messages = messages.len(), "OpenAI complete");

        let data: OpenAiChatResponse = self.post("chat/completions", &body).await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ConvoError::api(200, "No choices in OpenAI response"))?;

        Ok(Completion {
            text: choice.message.content.unwrap_or_default(),
            usage: data.usage.map(|u| Usage {
                prompt_tokens: u.prompt_tokens.unwrap_or_default(),
                completion_tokens: u.completion_tokens.unwrap_or_default(),
                total_tokens: u.total_tokens.unwrap_or_default(),
            }),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, model: &str, input: &str) -> Result<Vec<f32>, ConvoError> {
        let body = serde_json::json!({
            "model": model,
            "input": input,
        });
        debug!(model, "OpenAI embed");

        let data: OpenAiEmbeddingResponse = self.post("embeddings", &body).await?;
        data.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ConvoError::api(200, "No embedding in OpenAI response"))
    }
}

// OpenAI API response types (internal)

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: Option<u32>,
    completion_tokens: Option<u32>,
    total_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Deserialize)]
struct OpenAiEmbedding {
    embedding: Vec<f32>,
}
