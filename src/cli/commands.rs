//! CLI command handlers.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use super::{ChatArgs, Commands, ExportArgs, GlobalArgs};
use crate::config::ConvoConfig;
use crate::error::ConvoError;
use crate::memory::MemoryMode;
use crate::models::ChatModel;
use crate::provider::{self, CompletionProvider, UnavailableProvider};
use crate::registry::ConversationRegistry;
use crate::reply::ReplyService;
use crate::session::{SessionController, SessionOptions};
use crate::store::FileConversationStore;
use crate::vector_log::ExchangeRecorder;

/// Resolve config, applying CLI overrides on top of file and env.
pub fn load_config(global: &GlobalArgs) -> Result<ConvoConfig, ConvoError> {
    let file = global.config.clone().or_else(|| {
        let candidate = global.data_dir.as_ref()?.join("convo.toml");
        candidate.is_file().then_some(candidate)
    });
    let mut config = ConvoConfig::load(file.as_deref())?;
    apply_overrides(&mut config, global);
    Ok(config)
}

/// Flags win over file and env. An unknown `--memory` value falls back to
/// the default window, the same as in the config file and `CONVO_MEMORY`.
fn apply_overrides(config: &mut ConvoConfig, global: &GlobalArgs) {
    if let Some(ref dir) = global.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(ref mode) = global.memory {
        let parsed = MemoryMode::parse_or_default(Some(mode));
        if parsed.to_string() != mode.trim() {
            warn!(memory = %mode, fallback = %parsed, "unknown memory mode");
        }
        config.memory_mode = parsed;
    }
}

/// Wire store, registry, provider and recorder into a session.
pub fn build_session(config: &ConvoConfig) -> Result<SessionController, ConvoError> {
    let store = Arc::new(FileConversationStore::new(config.store_config()));
    let registry = ConversationRegistry::new(store, config.conversation_defaults());

    let openai = provider::create_provider(config).ok().map(Arc::new);
    let completions: Arc<dyn CompletionProvider> = match openai {
        Some(ref p) => p.clone() as Arc<dyn CompletionProvider>,
        None => Arc::new(UnavailableProvider::new("Missing OPENAI_API_KEY")),
    };
    let replies = ReplyService::new(completions, config.topic_model.clone());

    let options = SessionOptions {
        memory_mode: config.memory_mode,
        topic_max_chars: config.topic_max_chars,
    };
    let session = SessionController::open(registry, replies, options)?;

    Ok(match build_recorder(config, openai) {
        Some(recorder) => session.with_recorder(recorder),
        None => session,
    })
}

#[cfg(feature = "qdrant")]
fn build_recorder(
    config: &ConvoConfig,
    openai: Option<Arc<provider::openai::OpenAiProvider>>,
) -> Option<Arc<dyn ExchangeRecorder>> {
    use crate::vector_log::qdrant::{QdrantRecorder, QdrantSettings};

    let url = config.qdrant_url.clone()?;
    let Some(embedder) = openai else {
        warn!("QDRANT_URL is set but no API key is available for embeddings; vector log disabled");
        return None;
    };
    let settings = QdrantSettings {
        url,
        api_key: config.qdrant_api_key.clone(),
        collection: config.qdrant_collection.clone(),
        embedding_model: config.embedding_model.clone(),
    };
    Some(Arc::new(QdrantRecorder::new(settings, embedder)))
}

#[cfg(not(feature = "qdrant"))]
fn build_recorder(
    config: &ConvoConfig,
    _openai: Option<Arc<provider::openai::OpenAiProvider>>,
) -> Option<Arc<dyn ExchangeRecorder>> {
    if config.vector_log_enabled() {
        warn!("QDRANT_URL is set but convo was built without the qdrant feature");
    }
    None
}

/// Dispatch one parsed command.
pub async fn run(command: Commands, config: &ConvoConfig) -> Result<(), ConvoError> {
    if let Commands::Models = command {
        print_models();
        return Ok(());
    }

    let mut session = build_session(config)?;
    match command {
        Commands::Chat(args) => handle_chat(&mut session, args).await,
        Commands::List => handle_list(&session),
        Commands::New => {
            let convo = session.new_conversation()?;
            println!("Started conversation {}: {}", convo.id, convo.name);
            Ok(())
        }
        Commands::Switch(args) => {
            let convo = session.switch_to(args.id)?;
            println!("Switched to conversation {}: {}", convo.id, convo.name);
            Ok(())
        }
        Commands::Show => {
            print!("{}", session.transcript());
            Ok(())
        }
        Commands::Export(args) => handle_export(&session, args),
        Commands::Personality(args) => {
            session.set_personality(&args.value)?;
            println!("Personality updated for conversation {}", session.conversation().id);
            Ok(())
        }
        Commands::Model(args) => {
            if ChatModel::lookup(&args.value).is_none() {
                warn!(model = %args.value, "model is not in the catalog; cost will be unknown");
            }
            session.set_model(&args.value)?;
            println!("Model set to {}", session.conversation().model);
            Ok(())
        }
        Commands::Cost => {
            handle_cost(&session);
            Ok(())
        }
        Commands::History => {
            for exchange in session.logged_history().await? {
                println!("[{}]", exchange.timestamp.to_rfc3339());
                println!("user: {}", exchange.user);
                println!("assistant: {}\n", exchange.assistant);
            }
            Ok(())
        }
        Commands::Models => Ok(()),
    }
}

async fn handle_chat(session: &mut SessionController, args: ChatArgs) -> Result<(), ConvoError> {
    if let Some(prompt) = args.prompt {
        let reply = session.submit(&prompt).await?;
        println!("{}", reply.content);
        return Ok(());
    }

    let convo = session.conversation();
    eprintln!(
        "Conversation {}: {} (model {}, memory {}). /help for commands.",
        convo.id,
        convo.name,
        convo.model,
        session.memory_mode()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(command) = line.strip_prefix('/') {
            if !handle_slash(session, command)? {
                break;
            }
            continue;
        }
        match session.submit(line).await {
            Ok(reply) => println!("{}\n", reply.content),
            Err(err) if err.is_api() => {
                eprintln!("{}", super::errors::format_error_help(&err));
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Returns `false` when the loop should stop.
fn handle_slash(session: &mut SessionController, command: &str) -> Result<bool, ConvoError> {
    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(n, r)| (n, r.trim()))
        .unwrap_or((command, ""));
    match name {
        "quit" | "exit" => return Ok(false),
        "new" => {
            let convo = session.new_conversation()?;
            eprintln!("Started conversation {}: {}", convo.id, convo.name);
        }
        "memory" => match rest.parse::<MemoryMode>() {
            Ok(mode) => {
                session.set_memory_mode(mode);
                eprintln!("Memory mode: {mode}");
            }
            Err(_) => eprintln!("Unknown memory mode '{rest}'"),
        },
        "cost" => handle_cost(session),
        _ => eprintln!("Commands: /new, /memory <recent-10|extended-30|full>, /cost, /quit"),
    }
    Ok(true)
}

fn handle_list(session: &SessionController) -> Result<(), ConvoError> {
    let current = session.conversation().id;
    for summary in session.list()? {
        let marker = if summary.id == current { '*' } else { ' ' };
        println!("{marker} {:>4}  {}", summary.id, summary.name);
    }
    Ok(())
}

fn handle_export(session: &SessionController, args: ExportArgs) -> Result<(), ConvoError> {
    match args.output {
        Some(path) => {
            session.export_to(&path)?;
            eprintln!("Exported to {}", path.display());
        }
        None => print!("{}", session.transcript()),
    }
    Ok(())
}

fn handle_cost(session: &SessionController) {
    match session.running_cost() {
        Some(cost) => println!(
            "Cost: ${:.4} (input ${:.4}, output ${:.4})",
            cost.total_cost, cost.input_cost, cost.output_cost
        ),
        None => println!(
            "No pricing known for model {}",
            session.conversation().model
        ),
    }
}

fn print_models() {
    for model in ChatModel::all() {
        let pricing = model.pricing();
        println!(
            "{:<14} ${:>5.2} in / ${:>5.2} out per 1M tokens  {}",
            model.as_str(),
            pricing.input_per_m,
            pricing.output_per_m,
            model.description()
        );
    }
}
