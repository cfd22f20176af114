//! Tests for retrieval ranking over the built-in knowledge base.

use crate::context::{assemble, split_context};
use crate::corpus::Corpus;
use crate::retriever::retrieve;
use crate::vector_space::VectorSpace;

const QUERIES: &[&str] = &[
    "How long does the program take?",
    "What is the duration of the program?",
    "Do I need a GRE or GATE score?",
    "Which English level is required?",
    "semester",
    "management",
    "What is the capital of France?",
];

fn builtin() -> (Corpus, VectorSpace) {
    let corpus = Corpus::builtin();
    let space = VectorSpace::from_corpus(&corpus).unwrap();
    (corpus, space)
}

#[test]
fn test_results_are_ranked_and_bounded() {
    let (corpus, space) = builtin();

    for query in QUERIES {
        for top_n in [1, 3, 14, 20] {
            for min_score in [0.0, 1e-6, 0.2] {
                let results = retrieve(query, &space, &corpus, top_n, min_score);

                assert!(results.len() <= top_n);
                assert!(results.iter().all(|r| r.score >= min_score));
                for pair in results.windows(2) {
                    assert!(pair[0].score >= pair[1].score, "{}", query);
                    if pair[0].score == pair[1].score {
                        assert!(pair[0].passage.index < pair[1].passage.index);
                    }
                }
            }
        }
    }
}

#[test]
fn test_retrieval_is_idempotent() {
    let (corpus, space) = builtin();

    for query in QUERIES {
        let first = retrieve(query, &space, &corpus, 3, 1e-6);
        let second = retrieve(query, &space, &corpus, 3, 1e-6);
        assert_eq!(first, second);
    }
}

#[test]
fn test_shared_term_scores_positive() {
    let (corpus, space) = builtin();

    for passage in corpus.iter() {
        let word = passage
            .text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .find(|w| w.len() > 6)
            .unwrap();
        let results = retrieve(word, &space, &corpus, corpus.len(), 0.0);
        let own = results
            .iter()
            .find(|r| r.passage.index == passage.index)
            .unwrap();
        assert!(own.score > 0.0, "{} in passage {}", word, passage.index);
    }
}

#[test]
fn test_disjoint_query_returns_nothing() {
    let (corpus, space) = builtin();

    let all = retrieve("What is the capital of France?", &space, &corpus, 14, 0.0);
    assert_eq!(all.len(), 14);
    assert!(all.iter().all(|r| r.score == 0.0));

    let results = retrieve("What is the capital of France?", &space, &corpus, 3, 1e-6);
    assert!(results.is_empty());
    assert_eq!(assemble(&results), "");
}

#[test]
fn test_program_length_question() {
    let (corpus, space) = builtin();

    // Only "program" is shared with the corpus, so every passage naming the
    // program scores; the duration passage is among the top three.
    let results = retrieve("How long does the program take?", &space, &corpus, 3, 1e-6);
    assert_eq!(results.len(), 3);
    let duration = results
        .iter()
        .find(|r| r.passage.text.contains("four semesters, and there are no tuition fees"))
        .unwrap();
    assert!(duration.score > 0.0);
    assert!(results.iter().all(|r| !r.passage.text.contains("GRE")));
}

#[test]
fn test_duration_question_ranks_duration_first() {
    let (corpus, space) = builtin();

    let results = retrieve("What is the duration of the program?", &space, &corpus, 3, 1e-6);
    assert_eq!(results[0].passage.index, 1);
    assert!(results[0].score > results[1].score);
}

#[test]
fn test_specific_questions() {
    let (corpus, space) = builtin();

    let results = retrieve("Do I need a GRE or GATE score?", &space, &corpus, 3, 1e-6);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].passage.index, 5);

    let results = retrieve("Which English level is required?", &space, &corpus, 3, 1e-6);
    let order: Vec<usize> = results.iter().map(|r| r.passage.index).collect();
    assert_eq!(order, vec![4, 6, 0]);

    let results = retrieve("semester", &space, &corpus, 3, 1e-6);
    let order: Vec<usize> = results.iter().map(|r| r.passage.index).collect();
    assert_eq!(order, vec![11, 10, 9]);
}

#[test]
fn test_context_numbers_blocks_in_rank_order() {
    let (corpus, space) = builtin();

    let results = retrieve("Which English level is required?", &space, &corpus, 3, 1e-6);
    let context = assemble(&results);
    let blocks = split_context(&context);

    assert_eq!(blocks.len(), 3);
    for (i, block) in blocks.iter().enumerate() {
        assert!(block.starts_with(&format!("[PASSAGE {} | score=", i + 1)));
    }
    assert!(blocks[0].ends_with(&results[0].passage.text));
}
