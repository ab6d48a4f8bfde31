//! convo CLI binary entry point.

use clap::Parser;
use convo::cli::errors::format_error_help;
use convo::cli::{commands, Cli};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match commands::load_config(&cli.global) {
        Ok(config) => commands::run(cli.command, &config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error_help(&e));
        std::process::exit(1);
    }
}
