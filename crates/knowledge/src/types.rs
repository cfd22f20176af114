//! Knowledge system type definitions.

use kbqa_core::config::RetrievalConfig;
use serde::{Deserialize, Serialize};

/// A single knowledge base passage.
///
/// Passages are created once when the corpus is loaded and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Stable identifier (explicit in the corpus file, otherwise `kb-<index>`)
    pub id: String,

    /// Position in the corpus; breaks score ties
    pub index: usize,

    /// Passage text
    pub text: String,
}

/// A passage paired with its similarity to the current query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredPassage<'a> {
    pub passage: &'a Passage,

    /// Cosine similarity in [0, 1]
    pub score: f32,
}

/// Options for a retrieval call.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalOptions {
    /// Maximum number of results
    pub top_n: usize,

    /// Results scoring strictly below this are dropped
    pub min_score: f32,

    /// Character budget for the assembled context
    pub max_context_chars: Option<usize>,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self::from(&RetrievalConfig::default())
    }
}

impl From<&RetrievalConfig> for RetrievalOptions {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            top_n: config.top_n,
            min_score: config.min_score,
            max_context_chars: config.max_context_chars,
        }
    }
}

/// Summary of a loaded corpus and its fitted vector space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Domain label
    pub domain: String,

    /// Number of passages
    #[serde(rename = "passageCount")]
    pub passage_count: usize,

    /// Number of distinct indexed terms
    #[serde(rename = "vocabularySize")]
    pub vocabulary_size: usize,

    /// Mean number of indexed terms per passage
    #[serde(rename = "avgTermsPerPassage")]
    pub avg_terms_per_passage: f32,

    /// Total characters across all passages
    #[serde(rename = "totalChars")]
    pub total_chars: usize,
}
