//! Error types for convo.

use thiserror::Error;

/// Primary error type for all convo operations.
#[derive(Error, Debug)]
pub enum ConvoError {
    #[error("Conversation {id} not found")]
    NotFound { id: u64 },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Broad error kind surfaced to the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced conversation id has no stored document.
    NotFound,
    /// The completion or topic call failed (transport, auth, quota, bad response).
    Api,
    /// Reading or writing the persistence layer failed.
    Storage,
    Configuration,
    InvalidInput,
}

impl ConvoError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Api { .. } | Self::Network(_) | Self::Authentication(_) => ErrorKind::Api,
            Self::Storage(_) | Self::Io(_) | Self::Serialization(_) => ErrorKind::Storage,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::InvalidArgument(_) => ErrorKind::InvalidInput,
        }
    }

    /// Whether this error aborts a turn without touching storage.
    pub fn is_api(&self) -> bool {
        self.kind() == ErrorKind::Api
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ConvoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_classified() {
        let err = ConvoError::NotFound { id: 7 };
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Conversation 7 not found");
    }

    #[test]
    fn auth_failures_count_as_api_errors() {
        assert!(ConvoError::Authentication("bad key".into()).is_api());
        assert!(ConvoError::api(500, "boom").is_api());
    }

    #[test]
    fn disk_failures_count_as_storage_errors() {
        let io = ConvoError::Io(std::io::Error::other("disk full"));
        assert_eq!(io.kind(), ErrorKind::Storage);
        assert_eq!(ConvoError::storage("bad file").kind(), ErrorKind::Storage);
    }
}
