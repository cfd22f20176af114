//! Knowledge base and retrieval for kbqa.
//!
//! Holds the corpus, fits a TF-IDF vector space over it once, ranks passages
//! against questions and grounds generated answers on the best matches.
//!
//! # Example
//! ```
//! use kbqa_knowledge::{assemble, retrieve, Corpus, VectorSpace};
//!
//! let corpus = Corpus::builtin();
//! let space = VectorSpace::from_corpus(&corpus).unwrap();
//! let results = retrieve("Are there tuition fees?", &space, &corpus, 3, 1e-6);
//! assert_eq!(results[0].passage.id, "kb-1");
//! assert!(assemble(&results).starts_with("[PASSAGE 1 | score="));
//! ```

pub mod context;
pub mod corpus;
pub mod document_store;
pub mod rag;
pub mod retriever;
pub mod tokenize;
pub mod types;
pub mod vector_space;

#[cfg(test)]
mod tests;

pub use context::{assemble, assemble_with_budget, split_context, BLOCK_SEPARATOR};
pub use corpus::{load_corpus, Corpus, TH_OWL_DOMAIN};
pub use document_store::{DocumentStore, MemoryDocumentStore};
pub use rag::{AnswerGenerator, RagPipeline, RagSourceRef, RagTurn};
pub use retriever::retrieve;
pub use tokenize::Tokenizer;
pub use types::{CorpusStats, Passage, RetrievalOptions, ScoredPassage};
pub use vector_space::{SparseVector, VectorSpace};
