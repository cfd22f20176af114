//! Ollama provider implementation.
//!
//! This module provides integration with Ollama, a local LLM runtime.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use super::http::{build_http_client, post_chat};
use crate::client::{ChatReply, ChatRequest, LlmClient};
use crate::error::ChatError;
use kbqa_core::config::DEFAULT_OLLAMA_ENDPOINT;
use std::time::Duration;

/// Ollama chat client.
pub struct OllamaClient {
    /// Full `/api/chat` URL
    endpoint: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a client for the local default endpoint with a 60 second timeout.
    pub fn new() -> Result<Self, ChatError> {
        Self::with_endpoint(DEFAULT_OLLAMA_ENDPOINT, Duration::from_secs(60))
    }

    /// Create a client for a custom endpoint.
    ///
    /// A bare host such as `http://gpu-box:11434` is completed to `/api/chat`;
    /// any URL that already has a path is used as given.
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ChatError> {
        Ok(Self {
            endpoint: normalize_endpoint(endpoint.into()),
            client: build_http_client(timeout)?,
        })
    }
}

fn normalize_endpoint(endpoint: String) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    match reqwest::Url::parse(trimmed) {
        Ok(url) if url.path() == "/" && url.query().is_none() => format!("{}/api/chat", trimmed),
        _ => trimmed.to_string(),
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        tracing::info!("Sending chat request to Ollama");
        tracing::debug!("Request: {:?}", request);

        let reply = post_chat(&self.client, &self.endpoint, request, None).await?;

        tracing::debug!("Ollama reply shape: {}", reply.shape.name());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new().unwrap();
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.endpoint(), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_endpoint_normalization() {
        assert_eq!(
            normalize_endpoint("http://gpu-box:11434".to_string()),
            "http://gpu-box:11434/api/chat"
        );
        assert_eq!(
            normalize_endpoint("http://gpu-box:11434/api/chat/".to_string()),
            "http://gpu-box:11434/api/chat"
        );
        assert_eq!(
            normalize_endpoint("http://gpu-box:11434/api/generate".to_string()),
            "http://gpu-box:11434/api/generate"
        );
    }

    #[test]
    fn test_endpoint_with_path_is_kept() {
        assert_eq!(
            normalize_endpoint("https://host/ollama/chat".to_string()),
            "https://host/ollama/chat"
        );
        assert_eq!(
            normalize_endpoint("https://host/ollama/chat/".to_string()),
            "https://host/ollama/chat"
        );
        assert_eq!(
            normalize_endpoint("https://host/".to_string()),
            "https://host/api/chat"
        );
    }

    #[tokio::test]
    async fn test_chat_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(json!({"model": "deepseek-r1:7b", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "deepseek-r1:7b",
                "message": {"role": "assistant", "content": "Four semesters."},
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::with_endpoint(server.uri(), Duration::from_secs(5)).unwrap();
        let request = ChatRequest::grounded("deepseek-r1:7b", "system", "How long?");
        let reply = client.chat(&request).await.unwrap();

        assert_eq!(reply.text(), Some("Four semesters."));
    }

    #[tokio::test]
    async fn test_chat_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model 'x' not found"))
            .mount(&server)
            .await;

        let client = OllamaClient::with_endpoint(server.uri(), Duration::from_secs(5)).unwrap();
        let err = client
            .chat(&ChatRequest::grounded("x", "s", "u"))
            .await
            .unwrap_err();

        match err {
            ChatError::Status { status, body, .. } => {
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chat_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = OllamaClient::with_endpoint(server.uri(), Duration::from_secs(5)).unwrap();
        let err = client
            .chat(&ChatRequest::grounded("m", "s", "u"))
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn test_chat_timeout_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": {"content": "late"}}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let client =
            OllamaClient::with_endpoint(server.uri(), Duration::from_millis(200)).unwrap();
        let err = client
            .chat(&ChatRequest::grounded("m", "s", "u"))
            .await
            .unwrap_err();

        match err {
            ChatError::Transport { details, .. } => assert!(details.contains("timed out")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chat_connection_refused() {
        // Port 9 (discard) is not served on test machines
        let client =
            OllamaClient::with_endpoint("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client
            .chat(&ChatRequest::grounded("m", "s", "u"))
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::Transport { .. }));
    }
}
