//! Reply-shape normalisation.
//!
//! Different backends nest the generated text differently. Each known layout
//! is a typed struct; a body is matched against them in a fixed priority
//! order and the first one that deserializes with the right field types wins.

use serde::Deserialize;
use serde_json::Value;

/// Where the answer text was found in a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyShape {
    /// `{"message": {"content": "..."}}` (Ollama `/api/chat`)
    MessageContent(String),

    /// `{"message": {"content": [{"role": "assistant", "content": "..."}]}}`
    MessageEntries(String),

    /// `{"output": "..."}`
    Output(String),

    /// `{"response": [{"content": "..."}]}` or `{"response": [{"message": "..."}]}`
    ResponseEntries(String),

    /// `{"response": "..."}` (Ollama `/api/generate`)
    ResponseText(String),

    /// `{"choices": [{"text": "..."}]}` or `{"choices": [{"message": {"content": "..."}}]}`
    Choices(String),

    /// None of the above
    Unrecognized,
}

#[derive(Deserialize)]
struct MessageReply {
    message: MessageText,
}

#[derive(Deserialize)]
struct MessageText {
    content: String,
}

#[derive(Deserialize)]
struct MessageListReply {
    message: MessageList,
}

#[derive(Deserialize)]
struct MessageList {
    content: Vec<Value>,
}

#[derive(Deserialize)]
struct RoleEntry {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct OutputReply {
    output: String,
}

#[derive(Deserialize)]
struct ResponseListReply {
    response: Vec<Value>,
}

#[derive(Deserialize)]
struct ResponseEntry {
    content: Option<Value>,
    message: Option<Value>,
}

#[derive(Deserialize)]
struct ResponseTextReply {
    response: String,
}

#[derive(Deserialize)]
struct ChoicesReply {
    choices: Vec<Value>,
}

#[derive(Deserialize)]
struct Choice {
    text: Option<Value>,
    message: Option<Value>,
}

impl ReplyShape {
    /// Classify a reply body.
    pub fn parse(value: &Value) -> Self {
        if let Some(reply) = decode::<MessageReply>(value) {
            return Self::MessageContent(reply.message.content);
        }

        if let Some(reply) = decode::<MessageListReply>(value) {
            let assistant = reply
                .message
                .content
                .iter()
                .filter_map(decode::<RoleEntry>)
                .find(|entry| entry.role == "assistant");
            if let Some(entry) = assistant {
                return Self::MessageEntries(entry.content);
            }
        }

        if let Some(reply) = decode::<OutputReply>(value) {
            return Self::Output(reply.output);
        }

        if let Some(reply) = decode::<ResponseListReply>(value) {
            let text = reply
                .response
                .first()
                .and_then(decode::<ResponseEntry>)
                .and_then(|entry| first_string([entry.content, entry.message]));
            if let Some(text) = text {
                return Self::ResponseEntries(text);
            }
        }

        if let Some(reply) = decode::<ResponseTextReply>(value) {
            return Self::ResponseText(reply.response);
        }

        if let Some(reply) = decode::<ChoicesReply>(value) {
            let text = reply
                .choices
                .first()
                .and_then(decode::<Choice>)
                .and_then(|choice| {
                    let nested = choice
                        .message
                        .as_ref()
                        .and_then(decode::<MessageText>)
                        .map(|m| Value::String(m.content));
                    first_string([choice.text, nested])
                });
            if let Some(text) = text {
                return Self::Choices(text);
            }
        }

        Self::Unrecognized
    }

    /// The answer text for recognised shapes.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::MessageContent(text)
            | Self::MessageEntries(text)
            | Self::Output(text)
            | Self::ResponseEntries(text)
            | Self::ResponseText(text)
            | Self::Choices(text) => Some(text),
            Self::Unrecognized => None,
        }
    }

    /// Short label for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MessageContent(_) => "message.content",
            Self::MessageEntries(_) => "message.content[]",
            Self::Output(_) => "output",
            Self::ResponseEntries(_) => "response[]",
            Self::ResponseText(_) => "response",
            Self::Choices(_) => "choices[]",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Decode a JSON object into one of the shape structs.
///
/// Arrays are rejected up front: serde would otherwise accept them as
/// positional structs.
fn decode<T: for<'de> Deserialize<'de>>(value: &Value) -> Option<T> {
    if !value.is_object() {
        return None;
    }
    T::deserialize(value).ok()
}

/// First candidate that is a non-empty JSON string.
fn first_string<const N: usize>(candidates: [Option<Value>; N]) -> Option<String> {
    candidates.into_iter().flatten().find_map(|v| match v {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// Truncate to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
