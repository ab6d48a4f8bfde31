//! Shared test helpers and scripted provider.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use convo::error::ConvoError;
use convo::provider::{Completion, CompletionProvider};
use convo::registry::{ConversationDefaults, ConversationRegistry};
use convo::reply::{ReplyService, TOPIC_INSTRUCTION};
use convo::session::{SessionController, SessionOptions};
use convo::store::{ConversationStore, FileConversationStore, StoreConfig};
use convo::types::*;
use convo::vector_log::{ExchangeRecorder, StoredExchange};

pub const PERSONALITY: &str = "You are a test assistant.";

/// A provider that returns queued responses and captures every request.
///
/// Topic requests (system message equal to [`TOPIC_INSTRUCTION`]) and reply
/// requests draw from separate queues.
#[derive(Default)]
pub struct ScriptedProvider {
    topics: Mutex<VecDeque<Result<String, String>>>,
    replies: Mutex<VecDeque<Result<Completion, String>>>,
    requests: Mutex<Vec<(String, Vec<Message>)>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_topic(&self, text: &str) {
        self.topics.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn queue_topic_error(&self, message: &str) {
        self.topics.lock().unwrap().push_back(Err(message.to_string()));
    }

    /// Queue a reply with usage 10/20/30.
    pub fn queue_reply(&self, text: &str) {
        self.replies.lock().unwrap().push_back(Ok(Completion {
            text: text.to_string(),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 20,
                total_tokens: 30,
            }),
        }));
    }

    pub fn queue_reply_error(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Captured `(model, messages)` pairs, oldest first.
    pub fn requests(&self) -> Vec<(String, Vec<Message>)> {
        self.requests.lock().unwrap().clone()
    }

    /// Captured reply requests only (topic requests filtered out).
    pub fn reply_requests(&self) -> Vec<(String, Vec<Message>)> {
        self.requests()
            .into_iter()
            .filter(|(_, messages)| !is_topic_request(messages))
            .collect()
    }

    pub fn topic_request_count(&self) -> usize {
        self.requests()
            .iter()
            .filter(|(_, messages)| is_topic_request(messages))
            .count()
    }
}

fn is_topic_request(messages: &[Message]) -> bool {
    messages
        .first()
        .map(|m| m.role == Role::System && m.content == TOPIC_INSTRUCTION)
        .unwrap_or(false)
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
    ) -> Result<Completion, ConvoError> {
        self.requests
            .lock()
            .unwrap()
            .push((model.to_string(), messages.to_vec()));

        if is_topic_request(messages) {
            let next = self.topics.lock().unwrap().pop_front();
            return match next {
                Some(Ok(text)) => Ok(Completion { text, usage: None }),
                Some(Err(message)) => Err(ConvoError::api(500, message)),
                None => Ok(Completion {
                    text: "Scripted topic".to_string(),
                    usage: None,
                }),
            };
        }

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(completion)) => Ok(completion),
            Some(Err(message)) => Err(ConvoError::api(500, message)),
            None => Ok(Completion {
                text: "Mock response".to_string(),
                usage: None,
            }),
        }
    }
}

/// Recorder that keeps exchanges in memory, optionally failing every call.
#[derive(Default)]
pub struct MemoryRecorder {
    pub fail: AtomicBool,
    records: Mutex<Vec<(String, String, String)>>,
}

impl MemoryRecorder {
    pub fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<(String, String, String)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExchangeRecorder for MemoryRecorder {
    async fn record(&self, user: &str, assistant: &str, label: &str) -> Result<(), ConvoError> {
        self.records
            .lock()
            .unwrap()
            .push((user.to_string(), assistant.to_string(), label.to_string()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(ConvoError::api(503, "vector store down"));
        }
        Ok(())
    }

    async fn history(&self, label: &str) -> Result<Vec<StoredExchange>, ConvoError> {
        Ok(self
            .records()
            .into_iter()
            .filter(|(_, _, l)| l == label)
            .map(|(user, assistant, label)| StoredExchange {
                user,
                assistant,
                label,
                timestamp: chrono::Utc::now(),
            })
            .collect())
    }
}

/// File store whose `save` can be switched to fail.
pub struct FlakyStore {
    inner: FileConversationStore,
    pub fail_saves: AtomicBool,
}

impl FlakyStore {
    pub fn new(dir: &TempDir) -> Self {
        Self {
            inner: FileConversationStore::new(StoreConfig::new(dir.path())),
            fail_saves: AtomicBool::new(false),
        }
    }
}

impl ConversationStore for FlakyStore {
    fn load(&self, id: u64) -> Result<Conversation, ConvoError> {
        self.inner.load(id)
    }

    fn save(&self, conversation: &Conversation) -> Result<(), ConvoError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(ConvoError::storage("disk unavailable"));
        }
        self.inner.save(conversation)
    }

    fn exists(&self, id: u64) -> Result<bool, ConvoError> {
        self.inner.exists(id)
    }

    fn list_ids(&self) -> Result<Vec<u64>, ConvoError> {
        self.inner.list_ids()
    }

    fn current_id(&self) -> Result<u64, ConvoError> {
        self.inner.current_id()
    }

    fn set_current_id(&self, id: u64) -> Result<(), ConvoError> {
        self.inner.set_current_id(id)
    }
}

pub fn defaults() -> ConversationDefaults {
    ConversationDefaults {
        name_template: "Conversation {id}".to_string(),
        personality: PERSONALITY.to_string(),
        model: "gpt-4o".to_string(),
    }
}

pub fn file_store(dir: &TempDir) -> Arc<FileConversationStore> {
    Arc::new(FileConversationStore::new(StoreConfig::new(dir.path())))
}

/// Open a session over `store` backed by `provider`.
pub fn open_session(
    store: Arc<dyn ConversationStore>,
    provider: Arc<ScriptedProvider>,
    options: SessionOptions,
) -> SessionController {
    let registry = ConversationRegistry::new(store, defaults());
    let replies = ReplyService::new(provider, "topic-model");
    SessionController::open(registry, replies, options).unwrap()
}
