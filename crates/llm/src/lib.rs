//! Generation backend crate for kbqa.
//!
//! This crate provides a provider-agnostic abstraction for sending grounded
//! chat requests to a text-generation backend and normalising whatever reply
//! shape comes back.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime, `/api/chat` (default)
//! - **OpenAI-compatible**: `/v1/chat/completions` servers
//!
//! # Example
//! ```no_run
//! use kbqa_llm::{ChatRequest, LlmClient, providers::OllamaClient};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::with_endpoint("http://localhost:11434/api/chat", Duration::from_secs(60))?;
//! let request = ChatRequest::grounded("deepseek-r1:7b", "Answer from context only.", "Hello?");
//! let reply = client.chat(&request).await?;
//! println!("{:?}", reply.text());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod factory;
pub mod providers;
pub mod reply;
pub mod types;

// Re-export main types
pub use client::{ChatMessage, ChatReply, ChatRequest, ChatRole, LlmClient};
pub use error::ChatError;
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
pub use reply::{truncate_chars, ReplyShape};
pub use types::ProviderType;
