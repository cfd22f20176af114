//! Error types for kbqa.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, generation backend, knowledge base,
//! prompt and serialization errors.

use thiserror::Error;

/// Unified error type for kbqa.
///
/// Setup code returns `Result<T, AppError>`. Per-turn failures of the
/// generation backend are recovered into answer text and never reach `main`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generation backend errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Knowledge base and retrieval errors
    #[error("Knowledge error: {0}")]
    Knowledge(String),

    /// The knowledge base has no passages to ground answers on
    #[error("Knowledge base is empty. Add passages before starting the retriever.")]
    EmptyCorpus,

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_corpus_message() {
        let err = AppError::EmptyCorpus;
        assert!(err.to_string().contains("Knowledge base is empty"));
    }

    #[test]
    fn test_from_serde_json() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
