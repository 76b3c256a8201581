// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! AI provider adapters

mod openai;

pub use openai::{OpenAiProvider, DEFAULT_BASE_URL};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProvider, FakeReply};

use async_trait::async_trait;
use jm_core::ProviderError;
use serde_json::Value;

/// One structured-output generation call
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub model: String,
    /// JSON schema the response object must satisfy
    pub schema: Value,
    pub system_prompt: String,
    pub user_prompt: String,
    /// Provider-specific knobs merged into the request body
    pub provider_options: Value,
}

impl StructuredRequest {
    pub fn new(model: impl Into<String>, schema: Value) -> Self {
        Self {
            model: model.into(),
            schema,
            system_prompt: String::new(),
            user_prompt: String::new(),
            provider_options: Value::Null,
        }
    }

    pub fn system(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn user(mut self, prompt: impl Into<String>) -> Self {
        self.user_prompt = prompt.into();
        self
    }

    pub fn options(mut self, options: Value) -> Self {
        self.provider_options = options;
        self
    }
}

/// Adapter for schema-constrained generation
#[async_trait]
pub trait ProviderAdapter: Clone + Send + Sync + 'static {
    /// Generate one JSON object matching `request.schema`
    async fn generate_structured(&self, request: StructuredRequest)
        -> Result<Value, ProviderError>;
}
