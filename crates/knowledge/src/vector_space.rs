//! TF-IDF vector space.
//!
//! The space is fitted once from the corpus: vocabulary, smoothed inverse
//! document frequencies and one unit-length sparse vector per passage.
//! Queries are projected into it but never change it.

use crate::corpus::Corpus;
use crate::tokenize::Tokenizer;
use kbqa_core::{AppError, AppResult};
use std::collections::{BTreeMap, HashMap};

/// Sparse vector as `(term id, weight)` pairs sorted by term id.
pub type SparseVector = Vec<(usize, f32)>;

/// Fitted, read-only TF-IDF model over a corpus.
#[derive(Debug, Clone)]
pub struct VectorSpace {
    tokenizer: Tokenizer,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    vectors: Vec<SparseVector>,
    term_counts: Vec<usize>,
}

impl VectorSpace {
    /// Fit the space on a corpus.
    ///
    /// # Errors
    /// Returns [`AppError::EmptyCorpus`] when the corpus has no passages.
    pub fn from_corpus(corpus: &Corpus) -> AppResult<Self> {
        Self::build(corpus.iter().map(|p| p.text.as_str()))
    }

    /// Fit the space on raw texts with the default English tokenizer.
    pub fn build<I, S>(documents: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build_with(documents, Tokenizer::default())
    }

    /// Fit the space on raw texts with an explicit tokenizer.
    pub fn build_with<I, S>(documents: I, tokenizer: Tokenizer) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokenized: Vec<Vec<String>> = documents
            .into_iter()
            .map(|doc| tokenizer.terms(doc.as_ref()))
            .collect();

        if tokenized.is_empty() {
            return Err(AppError::EmptyCorpus);
        }

        // Sorted vocabulary gives deterministic column ids
        let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for terms in &tokenized {
            let mut seen: Vec<&str> = terms.iter().map(String::as_str).collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n = tokenized.len() as f32;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (column, (term, df)) in document_frequency.iter().enumerate() {
            vocabulary.insert((*term).to_string(), column);
            idf.push(((1.0 + n) / (1.0 + *df as f32)).ln() + 1.0);
        }

        let mut space = Self {
            tokenizer,
            vocabulary,
            idf,
            vectors: Vec::with_capacity(tokenized.len()),
            term_counts: Vec::with_capacity(tokenized.len()),
        };

        for terms in &tokenized {
            let vector = space.weigh(terms);
            space.term_counts.push(terms.len());
            space.vectors.push(vector);
        }

        tracing::debug!(
            "Fitted vector space: {} passages, {} terms",
            space.vectors.len(),
            space.idf.len()
        );

        Ok(space)
    }

    /// Project text into the space. Unknown terms are ignored; text with no
    /// known terms projects to the empty (zero) vector.
    pub fn project(&self, text: &str) -> SparseVector {
        self.weigh(&self.tokenizer.terms(text))
    }

    /// Cosine similarity of `query` against every passage, in corpus order.
    pub fn similarities(&self, query: &SparseVector) -> Vec<f32> {
        self.vectors
            .iter()
            .map(|vector| cosine(query, vector))
            .collect()
    }

    pub fn vector(&self, index: usize) -> Option<&SparseVector> {
        self.vectors.get(index)
    }

    /// Column id of a term, if it is in the vocabulary.
    pub fn term_id(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.term_id(term).map(|id| self.idf[id])
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    /// Number of indexed terms (after stop-word removal) per passage.
    pub fn term_counts(&self) -> &[usize] {
        &self.term_counts
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    fn weigh(&self, terms: &[String]) -> SparseVector {
        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();
        for term in terms {
            if let Some(&id) = self.vocabulary.get(term) {
                *counts.entry(id).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(id, tf)| (id, tf * self.idf[id]))
            .collect();

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut vector {
                *weight /= norm;
            }
        }

        vector
    }
}

/// Dot product of two unit-length sparse vectors, clamped to [0, 1].
fn cosine(a: &SparseVector, b: &SparseVector) -> f32 {
    let (mut i, mut j) = (0, 0);
    let mut dot = 0.0f32;

    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }

    dot.clamp(0.0, 1.0)
}
