//! Prompt system for kbqa.
//!
//! This crate turns a retrieved context and a user question into the
//! system/user message pair sent to the generation backend:
//! - YAML-based prompt definitions with a built-in grounded default
//! - Handlebars template rendering
//! - Explicit "no context" marker when retrieval found nothing

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_grounded_prompt;
pub use loader::{default_prompt, list_prompts, load_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptDefinition};
