//! Search command handler.
//!
//! Shows what the retriever ranks for a query without calling the backend.

use super::{build_pipeline, write_json};
use clap::Args;
use kbqa_core::{config::AppConfig, AppResult};
use kbqa_knowledge::{assemble, RagPipeline};
use std::io::Write;

/// Show the passages retrieved for a query
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Query text
    #[arg(required = true, num_args = 1..)]
    pub words: Vec<String>,

    /// Print the assembled context instead of a table
    #[arg(long)]
    pub context: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing search command");

        let pipeline = build_pipeline(config)?;
        self.run(&pipeline, &mut std::io::stdout())
    }

    /// Rank passages for the query and write them to `out`.
    pub fn run<W: Write>(&self, pipeline: &RagPipeline, out: &mut W) -> AppResult<()> {
        let query = self.words.join(" ");
        let results = pipeline.search(&query);

        if self.json {
            return write_json(out, &results);
        }

        if self.context {
            writeln!(out, "{}", assemble(&results))?;
            return Ok(());
        }

        if results.is_empty() {
            writeln!(out, "No passage scored at least {}", pipeline.options().min_score)?;
            return Ok(());
        }

        for (rank, result) in results.iter().enumerate() {
            writeln!(
                out,
                "{}. [{}] score={:.4}\n   {}",
                rank + 1,
                result.passage.id,
                result.score,
                result.passage.text
            )?;
        }

        Ok(())
    }
}
