//! Ask command handler.
//!
//! Answers one question and exits.

use super::{build_pipeline, write_json};
use clap::Args;
use kbqa_core::{config::AppConfig, AppError, AppResult};
use kbqa_knowledge::RagPipeline;
use std::io::Write;

/// Answer a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    #[arg(required = true, num_args = 1..)]
    pub words: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// The question as typed, words joined by single spaces.
    pub fn question(&self) -> String {
        self.words.join(" ")
    }

    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let pipeline = build_pipeline(config)?;
        self.run(&pipeline, &mut std::io::stdout()).await
    }

    /// Answer the question with `pipeline` and write the result to `out`.
    pub async fn run<W: Write>(&self, pipeline: &RagPipeline, out: &mut W) -> AppResult<()> {
        let question = self.question();
        if question.trim().is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let turn = pipeline.respond(question.trim()).await;

        if self.json {
            let output = serde_json::json!({
                "question": turn.query,
                "answer": turn.answer,
                "model": pipeline.generator().model(),
                "provider": pipeline.generator().provider_name(),
                "contextIncluded": turn.has_context(),
                "maxScore": turn.max_score(),
                "sources": turn.sources(),
            });
            return write_json(out, &output);
        }

        writeln!(out, "{}", turn.answer)?;
        writeln!(out)?;

        let sources = turn.sources();
        if sources.is_empty() {
            writeln!(out, "Sources: (no relevant passages)")?;
        } else {
            writeln!(out, "Sources:")?;
            for source in sources {
                writeln!(out, "- {} (score {:.4}): {}", source.id, source.score, source.snippet)?;
            }
        }

        Ok(())
    }
}
