//! Command handlers for the kbqa CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod chat;
pub mod search;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use search::SearchCommand;
pub use stats::StatsCommand;

use kbqa_core::config::AppConfig;
use kbqa_core::{AppError, AppResult};
use kbqa_knowledge::{load_corpus, AnswerGenerator, RagPipeline, RetrievalOptions};
use kbqa_llm::create_client;
use kbqa_prompt::load_prompt;
use std::io::Write;
use std::time::Duration;

/// Load the corpus and prompt, create the backend client and fit the
/// retriever. Every setup failure surfaces here, before any question is read.
pub fn build_pipeline(config: &AppConfig) -> AppResult<RagPipeline> {
    let corpus = load_corpus(config.resolved_corpus_file().as_deref())?;

    let prompt = load_prompt(&config.workspace, &config.prompt_id)?;
    tracing::debug!("Loaded prompt definition: {}", prompt.id);

    let endpoint = config.resolved_endpoint();
    let client = create_client(
        &config.provider,
        Some(endpoint.as_str()),
        config.api_key.as_deref(),
        Duration::from_secs(config.timeout_secs),
    )
    .map_err(AppError::Config)?;

    let generator = AnswerGenerator::new(client, &config.model, prompt, corpus.domain())?;

    RagPipeline::new(corpus, RetrievalOptions::from(&config.retrieval), generator)
}

/// Pretty-print a serializable value as JSON.
pub(crate) fn write_json<W: Write, T: serde::Serialize>(out: &mut W, value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

/// Built-in corpus and default prompt against an Ollama endpoint.
#[cfg(test)]
pub(crate) fn test_pipeline(endpoint: &str) -> RagPipeline {
    use kbqa_knowledge::Corpus;
    use kbqa_llm::OllamaClient;
    use kbqa_prompt::default_prompt;
    use std::sync::Arc;

    let client = OllamaClient::with_endpoint(endpoint, Duration::from_secs(5)).unwrap();
    let corpus = Corpus::builtin();
    let generator =
        AnswerGenerator::new(Arc::new(client), "deepseek-r1:7b", default_prompt(), corpus.domain())
            .unwrap();
    RagPipeline::new(corpus, RetrievalOptions::default(), generator).unwrap()
}
