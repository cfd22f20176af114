//! OpenAI-compatible provider (`/v1/chat/completions`).
//!
//! Works with llama.cpp server, vLLM, LM Studio and hosted OpenAI-style APIs.

use super::http::{build_http_client, post_chat};
use crate::client::{ChatReply, ChatRequest, LlmClient};
use crate::error::ChatError;
use std::time::Duration;

/// Client for OpenAI-style chat completion servers.
pub struct OpenAiClient {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client for the given chat completions URL.
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        Ok(Self {
            endpoint: endpoint.into(),
            api_key,
            client: build_http_client(timeout)?,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        tracing::info!("Sending chat completion request to {}", self.endpoint);
        tracing::debug!("Request: {:?}", request);

        let reply = post_chat(
            &self.client,
            &self.endpoint,
            request,
            self.api_key.as_deref(),
        )
        .await?;

        tracing::debug!("Chat completion reply shape: {}", reply.shape.name());
        Ok(reply)
    }
}
