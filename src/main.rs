//! # docchat — single-document question answering
//!
//! Upload a PDF, ask questions about it over HTTP. Text is chunked,
//! embedded through an OpenAI-compatible API, stored in SQLite, and
//! searched in memory with exact nearest-neighbor retrieval.
//!
//! Usage:
//!   docchat serve                   # Start the HTTP server
//!   docchat serve --port 8080       # Custom port
//!   docchat init                    # Write a default config file

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docchat_core::config::DocChatConfig;
use docchat_extract::PdftotextExtractor;
use docchat_gateway::AppState;
use docchat_knowledge::{ChunkStore, RetrievalService};

#[derive(Parser)]
#[command(name = "docchat", version, about = "Chat with a single uploaded PDF")]
struct Cli {
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve {
        /// Path to config file (default: ~/.docchat/config.toml)
        #[arg(short, long)]
        config: Option<String>,

        /// Override the configured listen port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Write the default config file and exit
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "docchat=debug,tower_http=debug"
    } else {
        "docchat=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command.unwrap_or(Commands::Serve {
        config: None,
        port: None,
    }) {
        Commands::Init => init_config(),
        Commands::Serve { config, port } => serve(config, port).await,
    }
}

fn init_config() -> Result<()> {
    let path = DocChatConfig::default_path();
    if path.exists() {
        println!("Config already exists at {}", path.display());
        return Ok(());
    }
    DocChatConfig::default().save()?;
    println!("Config written to {}", path.display());
    println!("Set your API key there or export OPENROUTER_API_KEY.");
    Ok(())
}

async fn serve(config_path: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = match config_path {
        Some(p) => DocChatConfig::load_from(std::path::Path::new(&p))?,
        None => DocChatConfig::load()?,
    };
    if let Some(p) = port {
        config.gateway.port = p;
    }
    config.validate()?;
    tracing::info!(
        model = %config.llm.model,
        chunk_words = config.retrieval.chunk_words,
        top_k = config.retrieval.top_k,
        "Configuration loaded"
    );

    let (embedder, completion) = docchat_providers::create_provider(&config)?;

    let db_path = config.db_path();
    let store = ChunkStore::open(&db_path)
        .with_context(|| format!("opening chunk store at {}", db_path.display()))?;

    let service = RetrievalService::new(
        store,
        embedder,
        completion,
        config.retrieval.chunk_words,
        config.retrieval.top_k,
    )?;

    let state = AppState {
        service: Arc::new(service),
        extractor: Arc::new(PdftotextExtractor::new()),
    };

    docchat_gateway::start(state, &config.gateway).await
}
