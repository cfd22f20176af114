//! Chat client abstraction and request/reply types.
//!
//! This module defines the core abstractions for talking to a generation
//! backend. Requests always keep the system instruction and the user query
//! in separate role-tagged messages.

use crate::error::ChatError;
use crate::reply::ReplyShape;
use serde::{Deserialize, Serialize};

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Chat completion request.
///
/// Serializes to the wire body shared by Ollama `/api/chat` and
/// OpenAI-compatible `/v1/chat/completions`:
/// `{"model": ..., "messages": [...], "stream": false}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model identifier (e.g., "deepseek-r1:7b")
    pub model: String,

    /// Ordered role-tagged messages
    pub messages: Vec<ChatMessage>,

    /// Streaming is never requested; the whole reply is read at once
    #[serde(default)]
    pub stream: bool,
}

impl ChatRequest {
    /// Create an empty request for the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            stream: false,
        }
    }

    /// Create the two-message request used for grounded answering.
    pub fn grounded(
        model: impl Into<String>,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self::new(model)
            .with_message(ChatMessage::system(system))
            .with_message(ChatMessage::user(user))
    }

    /// Append a message.
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Content of the first system message, if any.
    pub fn system(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == ChatRole::System)
            .map(|m| m.content.as_str())
    }
}

/// A successfully decoded JSON reply together with its recognised shape.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Which known layout the answer text was found in
    pub shape: ReplyShape,

    /// The untouched JSON body
    pub raw: serde_json::Value,
}

impl ChatReply {
    /// Classify a decoded JSON body.
    pub fn from_value(raw: serde_json::Value) -> Self {
        let shape = ReplyShape::parse(&raw);
        Self { shape, raw }
    }

    /// The extracted answer text, if the shape was recognised.
    pub fn text(&self) -> Option<&str> {
        self.shape.text()
    }
}

/// Trait for generation backends.
///
/// This trait abstracts the underlying provider (Ollama, OpenAI-compatible
/// servers) and provides a single non-streaming chat call.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the provider name (e.g., "ollama", "openai").
    fn provider_name(&self) -> &str;

    /// The full URL requests are posted to.
    fn endpoint(&self) -> &str;

    /// Perform a non-streaming chat completion.
    ///
    /// Transport problems, non-2xx statuses and non-JSON bodies come back as
    /// distinct [`ChatError`] variants; any JSON body is returned as a
    /// [`ChatReply`], recognised or not.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;
}
