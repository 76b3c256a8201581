// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OpenAI-compatible chat-completions provider

use super::{ProviderAdapter, StructuredRequest};
use async_trait::async_trait;
use jm_core::ProviderError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Provider speaking the `/chat/completions` API with `json_schema` output
#[derive(Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Read `OPENAI_API_KEY` and optional `OPENAI_BASE_URL`
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ProviderError::Validation("OPENAI_API_KEY is not set".to_string()))?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self::with_base_url(api_key, base_url))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// Request body for a structured chat completion
pub(crate) fn request_body(request: &StructuredRequest) -> Value {
    let mut messages = Vec::with_capacity(2);
    if !request.system_prompt.is_empty() {
        messages.push(ChatMessage {
            role: "system",
            content: &request.system_prompt,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: &request.user_prompt,
    });

    let mut body = json!({
        "model": request.model,
        "messages": messages,
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": "match_result",
                "strict": true,
                "schema": request.schema,
            }
        }
    });

    if let (Some(body), Some(options)) = (body.as_object_mut(), request.provider_options.as_object())
    {
        for (key, value) in options {
            body.insert(key.clone(), value.clone());
        }
    }
    body
}

/// Pull the structured object out of a chat-completions response
pub(crate) fn extract_object(text: &str) -> Result<Value, ProviderError> {
    let response: ChatResponse = serde_json::from_str(text)
        .map_err(|e| ProviderError::Parse(format!("invalid JSON in response body: {}", e)))?;

    let Some(choice) = response.choices.into_iter().next() else {
        return Err(ProviderError::NoObject("response contained no choices".to_string()));
    };
    if let Some(refusal) = choice.message.refusal {
        return Err(ProviderError::NoObject(format!("model refused: {}", refusal)));
    }
    let content = match choice.message.content {
        Some(content) if !content.trim().is_empty() => content,
        _ => return Err(ProviderError::NoObject("empty message content".to_string())),
    };
    serde_json::from_str(&content)
        .map_err(|e| ProviderError::Parse(format!("JSON parse error in message content: {}", e)))
}

fn map_send_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else if err.is_connect() || err.is_request() {
        ProviderError::Network(err.to_string())
    } else {
        ProviderError::Other(err.to_string())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<Value, ProviderError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request_body(&request))
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        let text = response.text().await.map_err(map_send_error)?;
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                message: text.chars().take(500).collect(),
            });
        }
        extract_object(&text)
    }
}

#[cfg(test)]
#[path = "openai_tests.rs"]
mod tests;
