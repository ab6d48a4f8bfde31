//! Side channel that mirrors finished exchanges into a vector index.
//!
//! Recording is best effort: callers log failures and move on.

#[cfg(feature = "qdrant")]
pub mod qdrant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConvoError;

/// One user/assistant exchange as stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredExchange {
    pub user: String,
    pub assistant: String,
    pub label: String,
    pub timestamp: DateTime<Utc>,
}

/// Remote keyed store that receives each completed turn.
#[async_trait]
pub trait ExchangeRecorder: Send + Sync {
    async fn record(
        &self,
        user_text: &str,
        assistant_text: &str,
        label: &str,
    ) -> Result<(), ConvoError>;

    /// Exchanges previously recorded under `label`, oldest first.
    async fn history(&self, label: &str) -> Result<Vec<StoredExchange>, ConvoError>;
}

/// Recorder used when no vector backend is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

#[async_trait]
impl ExchangeRecorder for NoopRecorder {
    async fn record(&self, _user: &str, _assistant: &str, _label: &str) -> Result<(), ConvoError> {
        Ok(())
    }

    async fn history(&self, _label: &str) -> Result<Vec<StoredExchange>, ConvoError> {
        Ok(Vec::new())
    }
}
