//! Stats command handler.
//!
//! Handles knowledge base statistics display.

use super::{build_pipeline, write_json};
use clap::Args;
use kbqa_core::{config::AppConfig, AppResult};
use kbqa_knowledge::RagPipeline;
use kbqa_prompt::list_prompts;
use std::io::Write;

/// Show knowledge base statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let pipeline = build_pipeline(config)?;
        let prompts = list_prompts(&config.workspace)?;
        self.run(&pipeline, &prompts, &mut std::io::stdout())
    }

    /// Write corpus, retrieval and backend details to `out`.
    pub fn run<W: Write>(
        &self,
        pipeline: &RagPipeline,
        prompts: &[String],
        out: &mut W,
    ) -> AppResult<()> {
        let stats = pipeline.stats();
        let options = pipeline.options();
        let generator = pipeline.generator();

        if self.json {
            let output = serde_json::json!({
                "corpus": stats,
                "retrieval": {
                    "topN": options.top_n,
                    "minScore": options.min_score,
                    "maxContextChars": options.max_context_chars,
                },
                "backend": {
                    "provider": generator.provider_name(),
                    "endpoint": generator.endpoint(),
                    "model": generator.model(),
                },
                "prompts": prompts,
            });
            return write_json(out, &output);
        }

        writeln!(out, "Knowledge base: {}", stats.domain)?;
        writeln!(out, "  Passages: {}", stats.passage_count)?;
        writeln!(out, "  Vocabulary: {} terms", stats.vocabulary_size)?;
        writeln!(out, "  Avg terms per passage: {:.1}", stats.avg_terms_per_passage)?;
        writeln!(out, "  Total characters: {}", stats.total_chars)?;
        writeln!(
            out,
            "Retrieval: top_n={} min_score={}",
            options.top_n, options.min_score
        )?;
        writeln!(
            out,
            "Backend: {} {} (model {})",
            generator.provider_name(),
            generator.endpoint(),
            generator.model()
        )?;
        writeln!(out, "Prompts: {}", prompts.join(", "))?;

        Ok(())
    }
}
