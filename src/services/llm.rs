//! Language-model completion boundary.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors raised while talking to the completion service
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no API key configured for the language model")]
    MissingCredentials,

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Strict JSON schema attached to a structured-output request
#[derive(Debug, Clone, Serialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub strict: bool,
    pub schema: Value,
}

impl JsonSchemaFormat {
    pub fn strict(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            strict: true,
            schema,
        }
    }
}

/// One completion call: a system instruction plus one user message
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub temperature: f32,
    pub system: String,
    pub user: String,
    pub schema: Option<JsonSchemaFormat>,
}

impl CompletionRequest {
    pub fn new(
        model: impl Into<String>,
        temperature: f32,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            temperature,
            system: system.into(),
            user: user.into(),
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: JsonSchemaFormat) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// A completion service returning the model's raw text
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;
}

/// Pull the generated text out of a response envelope.
///
/// Different SDKs and API versions put the text in different places; every
/// shape seen in practice is tried in turn.
pub fn extract_text(envelope: &Value) -> Option<String> {
    if let Some(text) = envelope.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    if let Some(content) = envelope.pointer("/choices/0/message/content") {
        if let Some(text) = content_text(content) {
            return Some(text);
        }
    }

    if let Some(output) = envelope.get("output").and_then(Value::as_array) {
        let joined: String = output
            .iter()
            .filter_map(|item| item.get("content"))
            .filter_map(content_text)
            .collect();
        if !joined.is_empty() {
            return Some(joined);
        }
    }

    if let Some(text) = envelope.get("content").and_then(content_text) {
        return Some(text);
    }

    envelope
        .get("text")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Text from a content field that is either a string or an array of parts
fn content_text(content: &Value) -> Option<String> {
    match content {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => {
            let joined: String = parts
                .iter()
                .filter_map(|part| match part {
                    Value::String(s) => Some(s.as_str()),
                    other => other.get("text").and_then(Value::as_str),
                })
                .collect();
            if joined.is_empty() {
                None
            } else {
                Some(joined)
            }
        }
        _ => None,
    }
}
