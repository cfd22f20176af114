//! Term extraction shared by the indexer and query projection.

use std::collections::HashSet;

/// Common English function words that carry no retrieval signal.
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "either",
    "else", "ever", "every", "few", "for", "from", "further", "had", "has", "have", "having", "he",
    "her", "here", "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in",
    "into", "is", "it", "its", "itself", "just", "may", "me", "might", "more", "most", "must",
    "my", "myself", "neither", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or",
    "other", "our", "ours", "ourselves", "out", "over", "own", "same", "shall", "she", "should",
    "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves", "then",
    "there", "these", "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "upon", "us", "very", "was", "we", "were", "what", "when", "where", "whether", "which",
    "while", "who", "whom", "whose", "why", "will", "with", "within", "without", "would", "yet",
    "you", "your", "yours", "yourself", "yourselves",
];

/// Splits text into lowercase terms.
///
/// A term is a run of at least two word characters (alphanumerics or `_`);
/// everything else separates terms. Stop words are dropped when enabled.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: HashSet<&'static str>,
}

impl Tokenizer {
    /// Tokenizer that drops English stop words.
    pub fn english() -> Self {
        Self {
            stop_words: ENGLISH_STOP_WORDS.iter().copied().collect(),
        }
    }

    /// Tokenizer that keeps every term.
    pub fn unfiltered() -> Self {
        Self {
            stop_words: HashSet::new(),
        }
    }

    pub fn filters_stop_words(&self) -> bool {
        !self.stop_words.is_empty()
    }

    /// Extract terms in order of appearance, duplicates included.
    pub fn terms(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let mut terms = Vec::new();
        let mut current = String::new();
        let mut current_chars = 0usize;

        for ch in lower.chars().chain(std::iter::once(' ')) {
            if ch.is_alphanumeric() || ch == '_' {
                current.push(ch);
                current_chars += 1;
                continue;
            }

            if current_chars >= 2 && !self.stop_words.contains(current.as_str()) {
                terms.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
            current_chars = 0;
        }

        terms
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::english()
    }
}
