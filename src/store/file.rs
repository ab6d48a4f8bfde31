use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ConversationStore;
use crate::error::ConvoError;
use crate::types::Conversation;

const CONVERSATIONS_DIR: &str = "conversations";
const CURRENT_FILE: &str = "current.json";
const DEFAULT_CURRENT_ID: u64 = 1;

/// Configuration for file-backed conversation storage.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_dir: PathBuf,
}

impl StoreConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

/// One JSON file per conversation plus a `current.json` pointer.
///
/// ```text
/// <base_dir>/current.json
/// <base_dir>/conversations/1.json
/// <base_dir>/conversations/2.json
/// ```
#[derive(Debug, Clone)]
pub struct FileConversationStore {
    base_dir: PathBuf,
}

impl FileConversationStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn conversations_dir(&self) -> PathBuf {
        self.base_dir.join(CONVERSATIONS_DIR)
    }

    fn conversation_path(&self, id: u64) -> PathBuf {
        self.conversations_dir().join(format!("{id}.json"))
    }

    fn current_path(&self) -> PathBuf {
        self.base_dir.join(CURRENT_FILE)
    }

    fn read_optional(path: &Path) -> Result<Option<String>, ConvoError> {
        match fs::read_to_string(path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ConvoError::storage(format!(
                "failed to read {}: {err}",
                path.display()
            ))),
        }
    }
}

impl ConversationStore for FileConversationStore {
    fn load(&self, id: u64) -> Result<Conversation, ConvoError> {
        let path = self.conversation_path(id);
        let raw = Self::read_optional(&path)?.ok_or(ConvoError::NotFound { id })?;
        serde_json::from_str(&raw).map_err(|err| {
            ConvoError::storage(format!("corrupt conversation {}: {err}", path.display()))
        })
    }

    fn save(&self, conversation: &Conversation) -> Result<(), ConvoError> {
        let path = self.conversation_path(conversation.id);
        let serialized = serde_json::to_vec_pretty(conversation)?;
        atomic_write(&path, &serialized)?;
        debug!(
            id = conversation.id,
            messages = conversation.messages.len(),
            "saved conversation"
        );
        Ok(())
    }

    fn exists(&self, id: u64) -> Result<bool, ConvoError> {
        Ok(self.conversation_path(id).is_file())
    }

    fn list_ids(&self) -> Result<Vec<u64>, ConvoError> {
        let dir = self.conversations_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(ConvoError::Io(err)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(id) = parse_document_name(&entry.file_name().to_string_lossy()) {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    fn current_id(&self) -> Result<u64, ConvoError> {
        let path = self.current_path();
        let stored = match Self::read_optional(&path)? {
            Some(raw) => {
                let pointer: CurrentPointer = serde_json::from_str(&raw).map_err(|err| {
                    ConvoError::storage(format!("corrupt pointer {}: {err}", path.display()))
                })?;
                pointer.current_conversation_id
            }
            None => 0,
        };
        // Ids are positive; a zero pointer is treated like a missing one.
        if stored > 0 {
            return Ok(stored);
        }
        self.set_current_id(DEFAULT_CURRENT_ID)?;
        Ok(DEFAULT_CURRENT_ID)
    }

    fn set_current_id(&self, id: u64) -> Result<(), ConvoError> {
        let pointer = CurrentPointer {
            current_conversation_id: id,
        };
        let serialized = serde_json::to_vec(&pointer)?;
        atomic_write(&self.current_path(), &serialized)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CurrentPointer {
    current_conversation_id: u64,
}

/// Accept `<positive-int>.json`, nothing else.
fn parse_document_name(name: &str) -> Option<u64> {
    let stem = name.strip_suffix(".json")?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok().filter(|id| *id > 0)
}

/// Write through a sibling temp file, fsync, then rename over the target.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), ConvoError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path.file_name().ok_or_else(|| {
        ConvoError::storage(format!("path {} has no file name", path.display()))
    })?;

    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_name = format!(
        ".{}.tmp-{}-{nonce}",
        file_name.to_string_lossy(),
        std::process::id()
    );
    let temp_path = path.with_file_name(temp_name);

    let write_result = (|| -> std::io::Result<()> {
        let mut temp_file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(ConvoError::Io(err));
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(ConvoError::Io(err));
    }

    Ok(())
}
