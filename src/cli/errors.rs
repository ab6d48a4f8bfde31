//! CLI-specific error formatting for user-facing messages.

use crate::error::{ConvoError, ErrorKind};

/// Map a [`ConvoError`] to a user-facing help string with actionable guidance.
pub fn format_error_help(err: &ConvoError) -> String {
    match err {
        ConvoError::NotFound { id } => {
            format!("Conversation {id} does not exist. Run: convo list")
        }
        ConvoError::Authentication(msg) => {
            format!("Authentication failed: {msg}. Set OPENAI_API_KEY in your environment or .env")
        }
        other if other.kind() == ErrorKind::Api => {
            format!("{other}. The turn was not saved; send the prompt again to retry")
        }
        other if other.kind() == ErrorKind::Storage => {
            format!("{other}. Check that the data directory is writable")
        }
        other => format!("{other}"),
    }
}
