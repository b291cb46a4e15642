use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::config::LlmSettings;
use crate::services::llm::{extract_text, CompletionClient, CompletionRequest, JsonSchemaFormat, LlmError};

/// OpenAI-compatible chat completions client
///
/// Works against any endpoint speaking the `/chat/completions` protocol
/// (OpenAI, Azure deployments behind a proxy, local gateways).
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: Client,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: &'a JsonSchemaFormat,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat<'a>>,
}

impl OpenAiClient {
    /// Create a new client; a blank API key is reported as missing credentials
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingCredentials);
        }

        let client = Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            base_url: base_url.into(),
            api_key,
            client,
        })
    }

    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        Self::new(
            settings.base_url.clone(),
            settings.api_key.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_body<'a>(request: &'a CompletionRequest) -> ChatBody<'a> {
        ChatBody {
            model: &request.model,
            temperature: request.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            response_format: request.schema.as_ref().map(|schema| ResponseFormat {
                format_type: "json_schema",
                json_schema: schema,
            }),
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        let start = Instant::now();
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&Self::build_body(&request))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(LlmError::Unauthorized);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError(format!("{}: {}", status, error_text)));
        }

        let envelope: Value = response.json().await?;
        let text = extract_text(&envelope)
            .ok_or_else(|| LlmError::InvalidResponse("no text in completion response".into()))?;

        tracing::debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis() as u64,
            chars = text.len(),
            "Language model completion"
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_key_is_missing_credentials() {
        let result = OpenAiClient::new("https://api.openai.com/v1", "  ", Duration::from_secs(5));
        assert!(matches!(result, Err(LlmError::MissingCredentials)));
    }

    #[test]
    fn test_body_includes_schema_only_when_set() {
        let plain = CompletionRequest::new("gpt-4o-mini", 0.1, "sys", "usr");
        let body = serde_json::to_value(OpenAiClient::build_body(&plain)).unwrap();
        assert!(body.get("response_format").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "usr");

        let strict = plain.with_schema(JsonSchemaFormat::strict("listing", json!({ "type": "object" })));
        let body = serde_json::to_value(OpenAiClient::build_body(&strict)).unwrap();
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "listing");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    }
}
