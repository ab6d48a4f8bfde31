//! Configuration (layered: defaults < TOML file < env).

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConvoError;
use crate::memory::MemoryMode;
use crate::models::DEFAULT_MODEL;
use crate::registry::ConversationDefaults;
use crate::store::StoreConfig;

/// Personality given to conversations nobody has edited yet.
pub const DEFAULT_PERSONALITY: &str = "You are a helpful, polite and concise AI assistant.";

pub const DEFAULT_NAME_TEMPLATE: &str = "Conversation {id}";

/// Maximum length of an auto-derived conversation name, in characters.
pub const DEFAULT_TOPIC_MAX_CHARS: usize = 50;

pub const DEFAULT_QDRANT_COLLECTION: &str = "chat_history";

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

const CONFIG_FILE_NAME: &str = "convo.toml";

/// Resolved application configuration.
#[derive(Clone, PartialEq)]
pub struct ConvoConfig {
    pub data_dir: PathBuf,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub default_model: String,
    pub topic_model: String,
    pub default_personality: String,
    pub name_template: String,
    pub topic_max_chars: usize,
    pub memory_mode: MemoryMode,
    pub qdrant_url: Option<String>,
    pub qdrant_api_key: Option<String>,
    pub qdrant_collection: String,
    pub embedding_model: String,
}

impl std::fmt::Debug for ConvoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvoConfig")
            .field("data_dir", &self.data_dir)
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("topic_model", &self.topic_model)
            .field("memory_mode", &self.memory_mode)
            .field("qdrant_url", &self.qdrant_url)
            .field("qdrant_collection", &self.qdrant_collection)
            .finish_non_exhaustive()
    }
}

impl Default for ConvoConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api_key: None,
            base_url: None,
            default_model: DEFAULT_MODEL.to_string(),
            topic_model: DEFAULT_MODEL.to_string(),
            default_personality: DEFAULT_PERSONALITY.to_string(),
            name_template: DEFAULT_NAME_TEMPLATE.to_string(),
            topic_max_chars: DEFAULT_TOPIC_MAX_CHARS,
            memory_mode: MemoryMode::default(),
            qdrant_url: None,
            qdrant_api_key: None,
            qdrant_collection: DEFAULT_QDRANT_COLLECTION.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }
}

/// On-disk config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    api_key: Option<String>,
    base_url: Option<String>,
    default_model: Option<String>,
    topic_model: Option<String>,
    default_personality: Option<String>,
    name_template: Option<String>,
    topic_max_chars: Option<usize>,
    memory_mode: Option<String>,
    qdrant_url: Option<String>,
    qdrant_api_key: Option<String>,
    qdrant_collection: Option<String>,
    embedding_model: Option<String>,
}

impl ConvoConfig {
    /// Load from `.env`, the process environment and an optional TOML file.
    ///
    /// Without an explicit `config_path`, `<data_dir>/convo.toml` is read
    /// when it exists.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConvoError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`ConvoConfig::load`] with an injectable environment lookup.
    pub fn load_with(
        config_path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConvoError> {
        let mut config = Self::default();
        if let Some(dir) = env("CONVO_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        let path = match config_path {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let candidate = config.data_dir.join(CONFIG_FILE_NAME);
                candidate.is_file().then_some(candidate)
            }
        };
        if let Some(path) = path {
            config.apply_file(&path)?;
        }

        config.apply_env(env);
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConvoError> {
        let raw = fs::read_to_string(path).map_err(|err| {
            ConvoError::Configuration(format!("cannot read {}: {err}", path.display()))
        })?;
        let file: ConfigFile = toml::from_str(&raw).map_err(|err| {
            ConvoError::Configuration(format!("invalid config {}: {err}", path.display()))
        })?;

        if let Some(v) = file.data_dir {
            self.data_dir = v;
        }
        merge(&mut self.api_key, file.api_key);
        merge(&mut self.base_url, file.base_url);
        set(&mut self.default_model, file.default_model);
        set(&mut self.topic_model, file.topic_model);
        set(&mut self.default_personality, file.default_personality);
        set(&mut self.name_template, file.name_template);
        if let Some(v) = file.topic_max_chars {
            self.topic_max_chars = v;
        }
        if let Some(v) = file.memory_mode {
            self.memory_mode = MemoryMode::parse_or_default(Some(&v));
        }
        merge(&mut self.qdrant_url, file.qdrant_url);
        merge(&mut self.qdrant_api_key, file.qdrant_api_key);
        set(&mut self.qdrant_collection, file.qdrant_collection);
        set(&mut self.embedding_model, file.embedding_model);
        Ok(())
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = env("CONVO_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        merge(&mut self.api_key, env("OPENAI_API_KEY"));
        merge(&mut self.base_url, env("OPENAI_BASE_URL"));
        set(&mut self.default_model, env("CONVO_MODEL"));
        set(&mut self.topic_model, env("CONVO_TOPIC_MODEL"));
        set(&mut self.default_personality, env("CONVO_PERSONALITY"));
        if let Some(v) = env("CONVO_MEMORY") {
            self.memory_mode = MemoryMode::parse_or_default(Some(&v));
        }
        merge(&mut self.qdrant_url, env("QDRANT_URL"));
        merge(&mut self.qdrant_api_key, env("QDRANT_API_KEY"));
        set(&mut self.qdrant_collection, env("QDRANT_COLLECTION"));
        set(&mut self.embedding_model, env("CONVO_EMBEDDING_MODEL"));
    }

    fn validate(&self) -> Result<(), ConvoError> {
        if self.topic_max_chars == 0 {
            return Err(ConvoError::Configuration(
                "topic_max_chars must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.data_dir.clone())
    }

    pub fn conversation_defaults(&self) -> ConversationDefaults {
        ConversationDefaults {
            name_template: self.name_template.clone(),
            personality: self.default_personality.clone(),
            model: self.default_model.clone(),
        }
    }

    /// Whether a vector log backend is configured.
    pub fn vector_log_enabled(&self) -> bool {
        self.qdrant_url.is_some()
    }
}

/// Per-user data directory, falling back to `./db`.
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "convo")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("db"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn merge(slot: &mut Option<String>, value: Option<String>) {
    if let Some(v) = non_blank(value) {
        *slot = Some(v);
    }
}

fn set(slot: &mut String, value: Option<String>) {
    if let Some(v) = non_blank(value) {
        *slot = v;
    }
}
