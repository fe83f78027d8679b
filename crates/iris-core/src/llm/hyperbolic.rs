//! Hyperbolic LLM provider (OpenAI-compatible API).
//!
//! Hyperbolic uses the same Chat Completions format as OpenAI,
//! so this delegates to `OpenAiProvider` with a custom endpoint.

use super::openai::OpenAiProvider;
use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::error::LlmError;
use async_trait::async_trait;

/// Hyperbolic provider wrapping an OpenAI-compatible endpoint.
pub struct HyperbolicProvider {
    inner: OpenAiProvider,
}

impl HyperbolicProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str, temperature: f32) -> Self {
        let url = format!("{}/chat/completions", endpoint.trim_end_matches('/'));
        Self {
            inner: OpenAiProvider::new(api_key, model, temperature).with_endpoint(&url),
        }
    }
}

#[async_trait]
impl LlmProvider for HyperbolicProvider {
    fn name(&self) -> &str {
        "hyperbolic"
    }

    fn model(&self) -> &str {
        self.inner.model()
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.inner.generate(request).await
    }
}
