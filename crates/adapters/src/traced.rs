// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced provider wrapper for consistent observability

use crate::provider::{ProviderAdapter, StructuredRequest};
use async_trait::async_trait;
use jm_core::{classify, ProviderError};
use serde_json::Value;

/// Wrapper that adds tracing to any ProviderAdapter
#[derive(Clone)]
pub struct TracedProvider<P> {
    inner: P,
}

impl<P> TracedProvider<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: ProviderAdapter> ProviderAdapter for TracedProvider<P> {
    async fn generate_structured(
        &self,
        request: StructuredRequest,
    ) -> Result<Value, ProviderError> {
        let span = tracing::info_span!("provider.generate", model = %request.model);
        let _guard = span.enter();

        // Precondition: there must be something to score
        if request.user_prompt.trim().is_empty() {
            tracing::error!("empty user prompt");
            return Err(ProviderError::Validation("user prompt is empty".to_string()));
        }

        tracing::debug!(prompt_len = request.user_prompt.len(), "starting");

        let start = std::time::Instant::now();
        let result = self.inner.generate_structured(request).await;
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(_) => tracing::debug!(elapsed_ms, "generated"),
            Err(e) => tracing::warn!(
                elapsed_ms,
                kind = %classify(e),
                error = %e,
                "generation failed"
            ),
        }

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
