//! Shared JSON-over-HTTP plumbing for chat providers.

use crate::client::{ChatReply, ChatRequest};
use crate::error::ChatError;
use crate::reply::truncate_chars;
use std::error::Error as _;
use std::time::Duration;

/// Longest slice of an error body kept in a [`ChatError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Build a reqwest client whose every request is bounded by `timeout`.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ChatError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ChatError::Transport {
            endpoint: String::new(),
            details: format!("failed to build HTTP client: {}", describe(&e)),
        })
}

/// POST a chat request and decode the JSON reply.
pub(crate) async fn post_chat(
    client: &reqwest::Client,
    endpoint: &str,
    request: &ChatRequest,
    bearer: Option<&str>,
) -> Result<ChatReply, ChatError> {
    let mut builder = client.post(endpoint).json(request);
    if let Some(token) = bearer {
        builder = builder.bearer_auth(token);
    }

    let response = builder.send().await.map_err(|e| transport(endpoint, &e))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ChatError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body: truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS).to_string(),
        });
    }

    let bytes = response.bytes().await.map_err(|e| transport(endpoint, &e))?;

    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| ChatError::MalformedBody(e.to_string()))?;

    Ok(ChatReply::from_value(value))
}

fn transport(endpoint: &str, err: &reqwest::Error) -> ChatError {
    let details = if err.is_timeout() {
        format!("request timed out ({})", describe(err))
    } else {
        describe(err)
    };

    ChatError::Transport {
        endpoint: endpoint.to_string(),
        details,
    }
}

/// Flatten an error and its sources into one line.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
