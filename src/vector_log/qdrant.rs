//! Qdrant REST recorder.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::{ExchangeRecorder, StoredExchange};
use crate::error::ConvoError;
use crate::provider::http::{api_key_headers, shared_client, status_to_error};
use crate::provider::EmbeddingProvider;

const SCROLL_PAGE: usize = 256;

/// Settings for [`QdrantRecorder`].
#[derive(Debug, Clone)]
pub struct QdrantSettings {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
    pub embedding_model: String,
}

/// Embeds each exchange and upserts it as a point with a JSON payload.
///
/// The collection is created on first use, sized from the first embedding.
pub struct QdrantRecorder {
    settings: QdrantSettings,
    embedder: Arc<dyn EmbeddingProvider>,
    collection_ready: OnceCell<()>,
}

impl std::fmt::Debug for QdrantRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantRecorder")
            .field("url", &self.settings.url)
            .field("collection", &self.settings.collection)
            .finish()
    }
}

impl QdrantRecorder {
    pub fn new(mut settings: QdrantSettings, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        settings.url = settings.url.trim_end_matches('/').to_string();
        Self {
            settings,
            embedder,
            collection_ready: OnceCell::new(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.settings.url, self.settings.collection)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, ConvoError> {
        let resp = request
            .headers(api_key_headers(self.settings.api_key.as_deref()))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status.as_u16(), &body_text));
        }
        Ok(resp.json().await?)
    }

    /// Create the collection unless it already exists.
    pub async fn ensure_collection(&self, vector_size: usize) -> Result<(), ConvoError> {
        let exists_url = format!("{}/exists", self.collection_url());
        let body = self.send(shared_client().get(&exists_url)).await?;
        let exists = body
            .pointer("/result/exists")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if exists {
            return Ok(());
        }

        let create = serde_json::json!({
            "vectors": { "size": vector_size, "distance": "Cosine" }
        });
        self.send(shared_client().put(self.collection_url()).json(&create))
            .await?;
        info!(collection = %self.settings.collection, vector_size, "created qdrant collection");
        Ok(())
    }
}

#[async_trait]
impl ExchangeRecorder for QdrantRecorder {
    async fn record(
        &self,
        user_text: &str,
        assistant_text: &str,
        label: &str,
    ) -> Result<(), ConvoError> {
        let text = format!("user: {user_text}\nassistant: {assistant_text}");
        let vector = self
            .embedder
            .embed(&self.settings.embedding_model, &text)
            .await?;
        if vector.is_empty() {
            return Err(ConvoError::api(200, "empty embedding"));
        }

        self.collection_ready
            .get_or_try_init(|| self.ensure_collection(vector.len()))
            .await?;

        let exchange = StoredExchange {
            user: user_text.to_string(),
            assistant: assistant_text.to_string(),
            label: label.to_string(),
            timestamp: Utc::now(),
        };
        let body = serde_json::json!({
            "points": [{
                "id": uuid::Uuid::new_v4().to_string(),
                "vector": vector,
                "payload": exchange,
            }]
        });
        let url = format!("{}/points?wait=true", self.collection_url());
        self.send(shared_client().put(&url).json(&body)).await?;
        debug!(label, "recorded exchange");
        Ok(())
    }

    async fn history(&self, label: &str) -> Result<Vec<StoredExchange>, ConvoError> {
        let url = format!("{}/points/scroll", self.collection_url());
        let mut exchanges = Vec::new();
        let mut offset: Option<serde_json::Value> = None;

        loop {
            let mut body = serde_json::json!({
                "filter": { "must": [{ "key": "label", "match": { "value": label } }] },
                "limit": SCROLL_PAGE,
                "with_payload": true,
                "with_vector": false,
            });
            if let (Some(obj), Some(next)) = (body.as_object_mut(), offset.take()) {
                obj.insert("offset".into(), next);
            }

            let raw = self.send(shared_client().post(&url).json(&body)).await?;
            let page: ScrollResponse = serde_json::from_value(raw)?;
            exchanges.extend(page.result.points.into_iter().map(|p| p.payload));

            match page.result.next_page_offset {
                Some(next) if !next.is_null() => offset = Some(next),
                _ => break,
            }
        }

        exchanges.sort_by_key(|e| e.timestamp);
        Ok(exchanges)
    }
}

#[derive(Deserialize)]
struct ScrollResponse {
    result: ScrollResult,
}

#[derive(Deserialize)]
struct ScrollResult {
    points: Vec<ScrollPoint>,
    #[serde(default)]
    next_page_offset: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ScrollPoint {
    payload: StoredExchange,
}
