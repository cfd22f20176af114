//! RAG (Retrieval-Augmented Generation) answering system.
//!
//! Provides grounded natural language answering over the knowledge base.

pub mod answer;
pub mod pipeline;
pub mod types;

pub use answer::AnswerGenerator;
pub use pipeline::RagPipeline;
pub use types::{RagSourceRef, RagTurn};
