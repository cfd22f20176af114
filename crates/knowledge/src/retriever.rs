//! Ranked retrieval over a fitted vector space.

use crate::corpus::Corpus;
use crate::types::ScoredPassage;
use crate::vector_space::VectorSpace;

/// Retrieve the passages most similar to `query`.
///
/// Results are ordered by descending score, ties by ascending corpus
/// position. Passages scoring below `min_score` are dropped and at most
/// `top_n` are returned. A blank query, or one with nothing above the
/// threshold, yields an empty list.
///
/// `space` must have been fitted on `corpus`.
pub fn retrieve<'a>(
    query: &str,
    space: &VectorSpace,
    corpus: &'a Corpus,
    top_n: usize,
    min_score: f32,
) -> Vec<ScoredPassage<'a>> {
    debug_assert_eq!(
        corpus.len(),
        space.len(),
        "vector space was fitted on a different corpus"
    );

    let query = query.trim();
    if query.is_empty() || top_n == 0 {
        return Vec::new();
    }

    let query_vector = space.project(query);
    let scores = space.similarities(&query_vector);

    let mut ranked: Vec<ScoredPassage<'a>> = corpus
        .iter()
        .zip(scores)
        .map(|(passage, score)| ScoredPassage { passage, score })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.passage.index.cmp(&b.passage.index))
    });

    let results: Vec<ScoredPassage<'a>> = ranked
        .into_iter()
        .filter(|result| result.score >= min_score)
        .take(top_n)
        .collect();

    match results.first() {
        Some(top) => tracing::debug!(
            "Retrieved {} passages (top: {} score={:.4})",
            results.len(),
            top.passage.id,
            top.score
        ),
        None => tracing::debug!("No passage scored at least {:.6}", min_score),
    }

    results
}
