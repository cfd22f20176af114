//! Generation client factory.
//!
//! Builds the client for the configured provider. Configuration has already
//! been validated by the time this runs, so failures here are setup errors.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use kbqa_core::config::{DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OPENAI_ENDPOINT};
use std::sync::Arc;
use std::time::Duration;

/// Create a generation client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "openai")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (sent as a bearer token by OpenAI-style clients)
/// * `timeout` - Upper bound for a single request
///
/// # Errors
/// Returns error if the provider is unknown or the HTTP client cannot be built.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;

    match provider_type {
        ProviderType::Ollama => {
            let endpoint = endpoint.unwrap_or(DEFAULT_OLLAMA_ENDPOINT);
            let client = OllamaClient::with_endpoint(endpoint, timeout)
                .map_err(|e| format!("Failed to create Ollama client: {}", e))?;
            Ok(Arc::new(client))
        }
        ProviderType::OpenAI => {
            let endpoint = endpoint.unwrap_or(DEFAULT_OPENAI_ENDPOINT);
            let client =
                OpenAiClient::with_endpoint(endpoint, api_key.map(str::to_string), timeout)
                    .map_err(|e| format!("Failed to create OpenAI-compatible client: {}", e))?;
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(60);

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None, TIMEOUT).unwrap();
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.endpoint(), DEFAULT_OLLAMA_ENDPOINT);
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client =
            create_client("ollama", Some("http://localhost:8080/api/chat"), None, TIMEOUT).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8080/api/chat");
    }

    #[test]
    fn test_create_openai_client_without_key() {
        // Local OpenAI-compatible servers usually need no key
        let client = create_client("openai", None, None, TIMEOUT).unwrap();
        assert_eq!(client.provider_name(), "openai");
        assert_eq!(client.endpoint(), DEFAULT_OPENAI_ENDPOINT);
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None, TIMEOUT) {
            Err(err) => assert!(err.contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
