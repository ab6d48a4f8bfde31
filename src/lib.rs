//! convo — chat client with file-backed conversation memory
//!
//! Conversations live as JSON documents on local disk together with a
//! pointer to the current one. Each user turn is answered by a hosted
//! completion API using a bounded window of earlier messages, then the
//! whole conversation is saved.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use convo::prelude::*;
//!
//! # async fn example() -> convo::error::Result<()> {
//! let config = ConvoConfig::load(None)?;
//! let store = Arc::new(FileConversationStore::new(config.store_config()));
//! let registry = ConversationRegistry::new(store, config.conversation_defaults());
//! let provider = Arc::new(convo::provider::create_provider(&config)?);
//! let replies = ReplyService::new(provider, config.topic_model.clone());
//!
//! let mut session = SessionController::open(registry, replies, SessionOptions::default())?;
//! let reply = session.submit("Hello!").await?;
//! println!("{}", reply.content);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod registry;
pub mod reply;
pub mod session;
pub mod store;
pub mod types;
pub mod vector_log;

#[cfg(feature = "cli")]
pub mod cli;
