//! RAG response types.

use crate::types::ScoredPassage;
use serde::Serialize;

/// Maximum snippet length for source references.
const MAX_SNIPPET_LENGTH: usize = 150;

/// A passage used to ground an answer, in user-facing form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RagSourceRef {
    /// Passage id (e.g. "kb-1")
    pub id: String,

    /// Similarity to the question
    pub score: f32,

    /// Start of the passage text (truncated if needed)
    pub snippet: String,
}

/// Everything produced while answering one question.
#[derive(Debug, Clone, Serialize)]
pub struct RagTurn<'a> {
    pub query: String,

    /// Retrieved passages in rank order
    pub results: Vec<ScoredPassage<'a>>,

    /// Context handed to the generator (empty on a retrieval miss)
    pub context: String,

    /// Backend answer, or a fallback message if the backend failed
    pub answer: String,
}

impl RagTurn<'_> {
    /// Whether any passage was retrieved.
    pub fn has_context(&self) -> bool {
        !self.context.is_empty()
    }

    /// Highest retrieval score, 0 when nothing was retrieved.
    pub fn max_score(&self) -> f32 {
        self.results.first().map(|r| r.score).unwrap_or(0.0)
    }

    /// Source references for the retrieved passages.
    pub fn sources(&self) -> Vec<RagSourceRef> {
        self.results
            .iter()
            .map(|result| RagSourceRef {
                id: result.passage.id.clone(),
                score: result.score,
                snippet: truncate_snippet(&result.passage.text, MAX_SNIPPET_LENGTH),
            })
            .collect()
    }
}

/// Truncate text to `max_len` characters, appending "..." when cut.
fn truncate_snippet(text: &str, max_len: usize) -> String {
    let truncated = kbqa_llm::truncate_chars(text, max_len);
    if truncated.len() < text.len() {
        format!("{}...", truncated.trim_end())
    } else {
        text.to_string()
    }
}
