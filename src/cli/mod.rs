//! CLI entry point for convo.

pub mod commands;
pub mod errors;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// convo: chat with file-backed conversation memory
#[derive(Parser, Debug)]
#[command(name = "convo", version, about = "Chat with file-backed conversation memory")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Directory holding conversations/ and current.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to a convo.toml config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Memory window: recent-10, extended-30 or full
    #[arg(long, global = true)]
    pub memory: Option<String>,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a prompt, or start an interactive session when none is given
    Chat(ChatArgs),
    /// List stored conversations
    List,
    /// Start a new conversation and make it current
    New,
    /// Make another conversation current
    Switch(SwitchArgs),
    /// Print the current conversation
    Show,
    /// Export the current conversation as plain text
    Export(ExportArgs),
    /// Set the personality of the current conversation
    Personality(TextArgs),
    /// Set the model of the current conversation
    Model(TextArgs),
    /// Show the running cost of the current conversation
    Cost,
    /// List known models and their pricing
    Models,
    /// Show exchanges recorded in the vector log for the current conversation
    History,
}

/// Arguments for `convo chat`.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// User prompt (positional)
    pub prompt: Option<String>,
}

/// Arguments for `convo switch`.
#[derive(Parser, Debug)]
pub struct SwitchArgs {
    /// Conversation id
    pub id: u64,
}

/// Arguments for `convo export`.
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Single free-text argument.
#[derive(Parser, Debug)]
pub struct TextArgs {
    pub value: String,
}
