//! Document store abstraction.
//!
//! Defines a trait for id-addressed passage storage with nearest-neighbour
//! queries, plus an in-process implementation on top of the TF-IDF
//! retriever.

use crate::corpus::Corpus;
use crate::retriever::retrieve;
use crate::vector_space::VectorSpace;
use kbqa_core::{AppError, AppResult};

/// Trait for document store backends.
///
/// Implementations must support:
/// - Upserting documents by id
/// - Querying the most similar documents for several query texts at once
pub trait DocumentStore: Send + Sync {
    /// Insert or replace documents. `ids` and `documents` are paired by
    /// position and must have the same length.
    fn upsert(&mut self, ids: &[String], documents: &[String]) -> AppResult<()>;

    /// For each query text, the `n_results` most similar documents in
    /// descending similarity order.
    fn query(&self, query_texts: &[String], n_results: usize) -> AppResult<Vec<Vec<String>>>;

    /// Number of stored documents.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory store backed by a TF-IDF vector space.
///
/// The space is refitted after every upsert. Only documents sharing at least
/// one term with the query are returned.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    ids: Vec<String>,
    documents: Vec<String>,
    index: Option<(Corpus, VectorSpace)>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with every passage of a corpus, keyed by passage id.
    pub fn from_corpus(corpus: &Corpus) -> AppResult<Self> {
        let mut store = Self::new();
        let ids: Vec<String> = corpus.iter().map(|p| p.id.clone()).collect();
        let documents: Vec<String> = corpus.iter().map(|p| p.text.clone()).collect();
        store.upsert(&ids, &documents)?;
        Ok(store)
    }

    /// Stored document for an id.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.ids
            .iter()
            .position(|existing| existing == id)
            .map(|pos| self.documents[pos].as_str())
    }

    fn reindex(&mut self) -> AppResult<()> {
        if self.documents.is_empty() {
            self.index = None;
            return Ok(());
        }

        let corpus = Corpus::from_texts(self.documents.iter().cloned())?;
        let space = VectorSpace::from_corpus(&corpus)?;
        self.index = Some((corpus, space));
        Ok(())
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn upsert(&mut self, ids: &[String], documents: &[String]) -> AppResult<()> {
        if ids.len() != documents.len() {
            return Err(AppError::Knowledge(format!(
                "upsert expects one document per id (got {} ids, {} documents)",
                ids.len(),
                documents.len()
            )));
        }

        for (id, document) in ids.iter().zip(documents) {
            match self.ids.iter().position(|existing| existing == id) {
                Some(pos) => self.documents[pos] = document.clone(),
                None => {
                    self.ids.push(id.clone());
                    self.documents.push(document.clone());
                }
            }
        }

        tracing::debug!("Upserted {} documents ({} stored)", ids.len(), self.ids.len());
        self.reindex()
    }

    fn query(&self, query_texts: &[String], n_results: usize) -> AppResult<Vec<Vec<String>>> {
        let Some((corpus, space)) = &self.index else {
            return Ok(vec![Vec::new(); query_texts.len()]);
        };

        Ok(query_texts
            .iter()
            .map(|query| {
                retrieve(query, space, corpus, n_results, f32::MIN_POSITIVE)
                    .into_iter()
                    .map(|result| result.passage.text.clone())
                    .collect()
            })
            .collect())
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}
