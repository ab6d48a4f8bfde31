//! Memory window selection.
//!
//! The window is the only context-length control: it trims by message
//! count, never by tokens.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::types::Message;

/// How much of the conversation log is sent as context.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum MemoryMode {
    /// Last 10 messages.
    #[default]
    #[strum(serialize = "recent-10")]
    #[serde(rename = "recent-10")]
    Recent10,
    /// Last 30 messages.
    #[strum(serialize = "extended-30")]
    #[serde(rename = "extended-30")]
    Extended30,
    /// The whole log.
    #[strum(serialize = "full")]
    #[serde(rename = "full")]
    Full,
}

impl MemoryMode {
    /// Parse a mode name, falling back to [`MemoryMode::Recent10`] for
    /// unknown or empty input.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or_default()
    }

    /// Maximum number of messages kept, `None` for unbounded.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::Recent10 => Some(10),
            Self::Extended30 => Some(30),
            Self::Full => None,
        }
    }
}

/// Select the trailing window of `log` allowed by `mode`, order preserved.
pub fn select(log: &[Message], mode: MemoryMode) -> &[Message] {
    match mode.limit() {
        Some(limit) if log.len() > limit => &log[log.len() - limit..],
        _ => log,
    }
}
