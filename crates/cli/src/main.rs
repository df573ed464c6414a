//! sibyl — retrieval-grounded question answering over a document base.
//!
//! Main entry point: loads the YAML configuration, wires the retriever,
//! backend and wrapper chain, then hands control to the interactive loop.

mod repl;

use clap::Parser;
use sibyl_core::{config::BotConfig, logging, AppResult};
use sibyl_qa::{build_assistant, create_backend, Bot};
use sibyl_retrieval::{create_retriever, store};
use std::path::PathBuf;
use std::sync::Arc;

/// Retrieval-grounded question answering over a fixed document base
#[derive(Parser, Debug)]
#[command(name = "sibyl")]
#[command(about = "Retrieval-grounded question answering over a fixed document base", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the YAML configuration file
    config: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    no_color: bool,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Load base configuration, then apply CLI overrides
    let config =
        BotConfig::load(&cli.config)?.with_overrides(cli.log_level, cli.verbose, cli.no_color);

    logging::init_logging(config.logging.level.as_deref(), config.logging.no_color)?;

    tracing::info!("sibyl starting");
    tracing::debug!("Configuration file: {:?}", cli.config);

    // The collection and the fitted retriever live for the whole process
    let docs = Arc::new(store::load_documents(
        &config.documents.path,
        &config.documents.query,
    )?);

    let retriever = create_retriever(&config.retriever, docs)?;
    let backend = create_backend(&config.backend)?;
    tracing::debug!("Backend: {}", backend.backend_name());

    let bot = Bot::new(retriever, backend).with_k_docs(config.answer.k_docs);
    let assistant = build_assistant(bot, &config.wrappers)?;

    repl::run(Arc::new(assistant)).await
}
