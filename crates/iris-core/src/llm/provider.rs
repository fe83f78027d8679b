//! LLM provider trait and request/response types.
//!
//! Defines the interface that all LLM providers implement, plus the
//! factory that builds the right provider from a [`ModelConfig`].

use crate::config::ModelConfig;
use crate::error::{LlmError, SetupError};
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

/// Base64-encoded image ready to send to an LLM API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg")
    pub media_type: String,
}

impl ImageInput {
    /// Wrap already-normalized JPEG bytes.
    pub fn jpeg(bytes: &[u8]) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: "image/jpeg".to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A single-image request: system instruction plus one user turn.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// System instruction
    pub system: String,
    /// Text part of the user turn
    pub prompt: String,
    /// Image part of the user turn
    pub image: ImageInput,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

/// The response from an LLM call.
///
/// Only `text` feeds the pipeline; the rest is auxiliary and ends up in logs.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text, possibly empty
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all LLM providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "anthropic", "ollama").
    fn name(&self) -> &str;

    /// Model name the provider was built for.
    fn model(&self) -> &str;

    /// Generate text for the given request.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;
}

/// Builds callable providers from model configs.
///
/// The pipeline only sees this trait, so tests can hand it scripted providers.
pub trait ModelFactory: Send + Sync {
    fn create(&self, config: &ModelConfig) -> Result<Box<dyn LlmProvider>, SetupError>;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory backed by the HTTP providers in this module.
#[derive(Debug, Clone, Copy, Default)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    fn api_key(config: &ModelConfig, env_var: &str, provider: &str) -> Result<String, SetupError> {
        let raw = config
            .api_key
            .clone()
            .unwrap_or_else(|| format!("${{{env_var}}}"));
        resolve_env_var(&raw).ok_or_else(|| {
            SetupError::ModelInit(format!(
                "{provider} API key not set. Set {env_var} env var."
            ))
        })
    }
}

impl ModelFactory for LlmProviderFactory {
    fn create(&self, config: &ModelConfig) -> Result<Box<dyn LlmProvider>, SetupError> {
        let model = config.name.as_str();
        match config.provider.as_str() {
            "ollama" => {
                let endpoint = config
                    .endpoint
                    .as_deref()
                    .unwrap_or("http://localhost:11434");
                Ok(Box::new(super::ollama::OllamaProvider::new(
                    endpoint,
                    model,
                    config.temperature,
                )))
            }
            "anthropic" => {
                let api_key = Self::api_key(config, "ANTHROPIC_API_KEY", "Anthropic")?;
                Ok(Box::new(super::anthropic::AnthropicProvider::new(
                    &api_key,
                    model,
                    config.temperature,
                )))
            }
            "openai" => {
                let api_key = Self::api_key(config, "OPENAI_API_KEY", "OpenAI")?;
                let mut provider =
                    super::openai::OpenAiProvider::new(&api_key, model, config.temperature);
                if let Some(endpoint) = &config.endpoint {
                    provider = provider.with_endpoint(endpoint);
                }
                Ok(Box::new(provider))
            }
            "hyperbolic" => {
                let api_key = Self::api_key(config, "HYPERBOLIC_API_KEY", "Hyperbolic")?;
                let endpoint = config
                    .endpoint
                    .as_deref()
                    .unwrap_or("https://api.hyperbolic.xyz/v1");
                Ok(Box::new(super::hyperbolic::HyperbolicProvider::new(
                    endpoint,
                    &api_key,
                    model,
                    config.temperature,
                )))
            }
            other => Err(SetupError::ModelInit(format!(
                "Unknown LLM provider: {other}"
            ))),
        }
    }
}

/// Upper bound on how long a provider's HTTP client waits on its own.
///
/// The pipeline applies the real (shorter) budget; this only keeps abandoned
/// requests from lingering forever.
pub(crate) const HTTP_TIMEOUT: Duration = Duration::from_secs(120);
