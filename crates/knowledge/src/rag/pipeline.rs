//! RAG answering orchestration.
//!
//! Retrieves relevant passages, assembles them into context and generates a
//! grounded answer.

use crate::context::assemble_with_budget;
use crate::corpus::Corpus;
use crate::rag::answer::AnswerGenerator;
use crate::rag::types::RagTurn;
use crate::retriever::retrieve;
use crate::types::{CorpusStats, RetrievalOptions, ScoredPassage};
use crate::vector_space::VectorSpace;
use kbqa_core::AppResult;

/// Corpus, fitted vector space and generator for one process.
#[derive(Debug)]
pub struct RagPipeline {
    corpus: Corpus,
    space: VectorSpace,
    options: RetrievalOptions,
    generator: AnswerGenerator,
}

impl RagPipeline {
    /// Fit the vector space and assemble the pipeline.
    ///
    /// # Errors
    /// Returns [`kbqa_core::AppError::EmptyCorpus`] for a corpus without
    /// passages.
    pub fn new(
        corpus: Corpus,
        options: RetrievalOptions,
        generator: AnswerGenerator,
    ) -> AppResult<Self> {
        let space = VectorSpace::from_corpus(&corpus)?;

        tracing::info!(
            "Knowledge base ready: {} passages, {} terms",
            corpus.len(),
            space.vocabulary_size()
        );

        Ok(Self {
            corpus,
            space,
            options,
            generator,
        })
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn space(&self) -> &VectorSpace {
        &self.space
    }

    pub fn options(&self) -> &RetrievalOptions {
        &self.options
    }

    pub fn generator(&self) -> &AnswerGenerator {
        &self.generator
    }

    /// Retrieval only.
    pub fn search(&self, query: &str) -> Vec<ScoredPassage<'_>> {
        retrieve(
            query,
            &self.space,
            &self.corpus,
            self.options.top_n,
            self.options.min_score,
        )
    }

    /// Retrieve, assemble and answer one question.
    pub async fn respond(&self, query: &str) -> RagTurn<'_> {
        let results = self.search(query);
        let context = assemble_with_budget(&results, self.options.max_context_chars);

        if results.is_empty() {
            tracing::info!("No relevant passages found for query");
        }

        let answer = self.generator.answer(query, &context).await;

        RagTurn {
            query: query.to_string(),
            results,
            context,
            answer,
        }
    }

    /// Corpus and vocabulary statistics.
    pub fn stats(&self) -> CorpusStats {
        let term_counts = self.space.term_counts();
        let total_terms: usize = term_counts.iter().sum();

        CorpusStats {
            domain: self.generator.domain().to_string(),
            passage_count: self.corpus.len(),
            vocabulary_size: self.space.vocabulary_size(),
            avg_terms_per_passage: if term_counts.is_empty() {
                0.0
            } else {
                total_terms as f32 / term_counts.len() as f32
            },
            total_chars: self.corpus.iter().map(|p| p.text.chars().count()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbqa_core::AppError;
    use kbqa_llm::OllamaClient;
    use kbqa_prompt::default_prompt;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator(endpoint: &str) -> AnswerGenerator {
        let client = OllamaClient::with_endpoint(endpoint, Duration::from_secs(5)).unwrap();
        AnswerGenerator::new(Arc::new(client), "deepseek-r1:7b", default_prompt(), Some("TH OWL"))
            .unwrap()
    }

    #[test]
    fn test_empty_corpus_fails_setup() {
        let corpus = Corpus::from_texts(Vec::<String>::new()).unwrap();
        let err = RagPipeline::new(
            corpus,
            RetrievalOptions::default(),
            generator("http://127.0.0.1:9/api/chat"),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::EmptyCorpus));
    }

    #[test]
    fn test_stats() {
        let pipeline = RagPipeline::new(
            Corpus::builtin(),
            RetrievalOptions::default(),
            generator("http://127.0.0.1:9/api/chat"),
        )
        .unwrap();

        let stats = pipeline.stats();
        assert_eq!(stats.domain, "TH OWL");
        assert_eq!(stats.passage_count, 14);
        assert_eq!(stats.vocabulary_size, 116);
        assert!(stats.avg_terms_per_passage > 0.0);
        assert!(stats.total_chars > 0);
    }

    #[tokio::test]
    async fn test_respond_with_context() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": {"content": "There are no tuition fees."}})),
            )
            .mount(&server)
            .await;

        let pipeline = RagPipeline::new(
            Corpus::builtin(),
            RetrievalOptions::default(),
            generator(&format!("{}/api/chat", server.uri())),
        )
        .unwrap();

        let turn = pipeline.respond("Are there tuition fees?").await;
        assert_eq!(turn.answer, "There are no tuition fees.");
        assert_eq!(turn.results.len(), 1);
        assert_eq!(turn.results[0].passage.index, 1);
        assert!(turn.context.starts_with("[PASSAGE 1 | score="));
    }

    #[tokio::test]
    async fn test_respond_miss_still_answers() {
        let pipeline = RagPipeline::new(
            Corpus::builtin(),
            RetrievalOptions::default(),
            generator("http://127.0.0.1:9/api/chat"),
        )
        .unwrap();

        let turn = pipeline.respond("What is the capital of France?").await;
        assert!(turn.results.is_empty());
        assert!(!turn.has_context());
        assert!(turn.answer.starts_with("Error: Could not connect"));
    }

    #[test]
    fn test_context_budget_applies() {
        let pipeline = RagPipeline::new(
            Corpus::builtin(),
            RetrievalOptions {
                top_n: 3,
                min_score: 1e-6,
                max_context_chars: Some(10),
            },
            generator("http://127.0.0.1:9/api/chat"),
        )
        .unwrap();

        let results = pipeline.search("semester");
        assert_eq!(results.len(), 3);
        let context = assemble_with_budget(&results, pipeline.options().max_context_chars);
        assert_eq!(crate::context::split_context(&context).len(), 1);
    }
}
