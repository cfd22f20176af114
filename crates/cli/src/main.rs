//! kbqa CLI
//!
//! Main entry point for the kbqa command-line tool.
//! Answers questions about a small knowledge base with retrieval-grounded
//! generation.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, SearchCommand, StatsCommand};
use kbqa_core::config::{AppConfig, ConfigOverrides};
use kbqa_core::{logging, AppResult};
use std::path::PathBuf;

/// kbqa - knowledge base question answering grounded on retrieved passages
#[derive(Parser, Debug)]
#[command(name = "kbqa")]
#[command(about = "Knowledge base question answering with TF-IDF retrieval", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "KBQA_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "KBQA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Generation provider (ollama, openai, openai-compatible)
    #[arg(short, long, global = true, env = "KBQA_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "KBQA_MODEL")]
    model: Option<String>,

    /// Generation backend URL
    #[arg(long, global = true, env = "KBQA_ENDPOINT")]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Maximum number of passages used as context
    #[arg(long, global = true)]
    top_n: Option<usize>,

    /// Minimum similarity score for a passage to be used
    #[arg(long, global = true)]
    min_score: Option<f32>,

    /// Character budget for the assembled context
    #[arg(long, global = true)]
    max_context_chars: Option<usize>,

    /// YAML or JSON corpus file (default: built-in TH OWL passages)
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Prompt definition id
    #[arg(long, global = true)]
    prompt: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive question session (default)
    Chat(ChatCommand),

    /// Answer a single question
    Ask(AskCommand),

    /// Show the passages retrieved for a query
    Search(SearchCommand),

    /// Show knowledge base statistics
    Stats(StatsCommand),
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            workspace: self.workspace.clone(),
            config_file: self.config.clone(),
            provider: self.provider.clone(),
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            timeout_secs: self.timeout_secs,
            top_n: self.top_n,
            min_score: self.min_score,
            max_context_chars: self.max_context_chars,
            corpus_file: self.corpus.clone(),
            prompt_id: self.prompt.clone(),
            log_level: self.log_level.clone(),
            verbose: self.verbose,
            no_color: self.no_color,
        }
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Defaults, config file and environment
    let config = AppConfig::load_with(cli.workspace.clone(), cli.config.clone())?;

    // Apply CLI overrides
    let config = config.with_overrides(cli.overrides());

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    config.validate()?;

    tracing::info!("kbqa starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Chat(ChatCommand::default()));

    let command_name = match &command {
        Commands::Chat(_) => "chat",
        Commands::Ask(_) => "ask",
        Commands::Search(_) => "search",
        Commands::Stats(_) => "stats",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match command {
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Search(cmd) => cmd.execute(&config),
        Commands::Stats(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
