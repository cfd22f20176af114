//! Failure modes of a single generation call.

use kbqa_core::AppError;
use thiserror::Error;

/// Why a chat request did not produce a usable JSON reply.
///
/// Each variant is a separate failure mode so callers can word their
/// fallback answer accordingly. A reply that parses as JSON but has an
/// unknown shape is not an error here; see [`crate::ReplyShape::Unrecognized`].
#[derive(Error, Debug)]
pub enum ChatError {
    /// Connection refused, DNS failure, timeout or a broken body stream.
    #[error("could not reach {endpoint}: {details}")]
    Transport { endpoint: String, details: String },

    /// The backend answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The body was not valid JSON.
    #[error("invalid JSON body: {0}")]
    MalformedBody(String),
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        AppError::Llm(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_into_app_error() {
        let err = ChatError::Status {
            endpoint: "http://localhost:11434/api/chat".to_string(),
            status: 404,
            body: "model not found".to_string(),
        };
        let app: AppError = err.into();
        assert!(matches!(app, AppError::Llm(ref msg) if msg.contains("HTTP 404")));
    }
}
