//! LLM integration for image description.
//!
//! Provides a provider abstraction over multiple LLM backends (Ollama, Anthropic,
//! OpenAI, Hyperbolic), vision model selection, and the rate-limit hook the
//! pipeline invokes before each call.

pub(crate) mod anthropic;
pub(crate) mod hyperbolic;
pub(crate) mod ollama;
pub(crate) mod openai;
pub mod provider;
pub mod rate_limit;
pub mod select;

pub use provider::{
    ImageInput, LlmProvider, LlmProviderFactory, LlmRequest, LlmResponse, ModelFactory,
};
pub use rate_limit::{NoRateLimit, RateLimitHook};
pub use select::select_vision_model;
