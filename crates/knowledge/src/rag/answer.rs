//! Grounded answer generation.
//!
//! Renders the grounding prompt, makes one call to the generation backend
//! and turns whatever comes back into answer text. Backend failures never
//! escape: each failure mode becomes its own fallback message.

use kbqa_core::AppResult;
use kbqa_llm::{truncate_chars, ChatError, ChatReply, ChatRequest, LlmClient};
use kbqa_prompt::{build_grounded_prompt, BuiltPrompt, PromptDefinition};
use std::sync::Arc;

/// Maximum characters of a raw reply echoed back for an unrecognised shape.
const MAX_RAW_REPLY_CHARS: usize = 2000;

/// Produces answers grounded on retrieved context.
#[derive(Clone)]
pub struct AnswerGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    domain: String,
}

impl AnswerGenerator {
    /// Create a generator.
    ///
    /// `domain` is the corpus's own label; without one the prompt's domain
    /// is named in the system instruction. The prompt is rendered once up
    /// front so a broken template is reported at startup instead of on the
    /// first question.
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
        domain: Option<&str>,
    ) -> AppResult<Self> {
        let domain = domain.map_or_else(|| prompt.domain.clone(), str::to_string);
        let generator = Self {
            client,
            model: model.into(),
            prompt,
            domain,
        };
        generator.build_prompt("", "")?;
        Ok(generator)
    }

    /// Domain named in the system instruction.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    /// Answer `query` from `context`. An empty context is replaced by the
    /// prompt's no-context marker.
    pub async fn answer(&self, query: &str, context: &str) -> String {
        let prompt = match self.build_prompt(query, context) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::warn!("Failed to render prompt '{}': {}", self.prompt.id, e);
                return format!("Error: Could not build the grounding prompt. Details: {}", e);
            }
        };

        let request = ChatRequest::grounded(&self.model, prompt.system, prompt.user);

        tracing::info!(
            "Sending question to {} ({}, model {})",
            self.client.endpoint(),
            self.client.provider_name(),
            self.model
        );

        match self.client.chat(&request).await {
            Ok(reply) => self.reply_text(reply),
            Err(err) => self.fallback(err),
        }
    }

    fn build_prompt(&self, query: &str, context: &str) -> AppResult<BuiltPrompt> {
        build_grounded_prompt(&self.prompt, query, context, Some(self.domain.as_str()))
    }

    fn reply_text(&self, reply: ChatReply) -> String {
        if let Some(text) = reply.text() {
            tracing::debug!("Reply shape: {}", reply.shape.name());
            return text.to_string();
        }

        tracing::warn!("Unrecognised reply shape from {}", self.client.endpoint());
        let raw = reply.raw.to_string();
        format!(
            "Warning: Unexpected response shape from the generation backend. Raw response (truncated): {}",
            truncate_chars(&raw, MAX_RAW_REPLY_CHARS)
        )
    }

    fn fallback(&self, err: ChatError) -> String {
        tracing::warn!("Generation failed: {}", err);

        match err {
            ChatError::Transport { endpoint, details } => format!(
                "Error: Could not connect to the generation backend at {}. Ensure it is running and model '{}' is available. Details: {}",
                endpoint, self.model, details
            ),
            ChatError::Status {
                endpoint,
                status,
                body,
            } => format!(
                "Error: Generation backend at {} returned HTTP {}: {}",
                endpoint, status, body
            ),
            ChatError::MalformedBody(_) => {
                "Error: Invalid JSON response from the generation backend.".to_string()
            }
        }
    }
}

impl std::fmt::Debug for AnswerGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerGenerator")
            .field("provider", &self.client.provider_name())
            .field("endpoint", &self.client.endpoint())
            .field("model", &self.model)
            .field("prompt", &self.prompt.id)
            .field("domain", &self.domain)
            .finish()
    }
}
