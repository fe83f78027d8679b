//! The describe stage: one time-bounded model call per image.

use std::time::Duration;

use crate::error::{IntakeError, IntakeResult};
use crate::llm::{ImageInput, LlmProvider, LlmRequest, LlmResponse, RateLimitHook};

pub const DESCRIBE_SYSTEM_PROMPT: &str = "You describe images concisely and accurately in 3-8 sentences. \
     Focus on: visible text and labels, layout structure, UI elements and their states, \
     colors and visual hierarchy, data in charts/tables/graphs, and any errors or warnings. \
     Be specific and factual about what you see.";

pub const DESCRIBE_USER_PROMPT: &str = "Describe this image. Include:\n\
     - Any visible text, headings, or labels\n\
     - Layout and structural organization\n\
     - UI states (active/disabled buttons, form fields, error indicators)\n\
     - Notable colors or visual emphasis\n\
     - Data shown in charts, tables, or graphs\n\
     - Any errors, warnings, overlays, or popups\n\n\
     Be specific and factual:";

/// Issues describe calls against one provider.
pub struct Describer<'a> {
    provider: &'a dyn LlmProvider,
    rate_limiter: &'a dyn RateLimitHook,
    max_tokens: u32,
    timeout: Duration,
}

impl<'a> Describer<'a> {
    pub fn new(
        provider: &'a dyn LlmProvider,
        rate_limiter: &'a dyn RateLimitHook,
        max_tokens: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            rate_limiter,
            max_tokens,
            timeout,
        }
    }

    /// Build the request for one compressed image.
    pub fn request(&self, path: &str, jpeg: &[u8]) -> LlmRequest {
        LlmRequest {
            system: DESCRIBE_SYSTEM_PROMPT.to_string(),
            prompt: format!("Image: {path}\n\n{DESCRIBE_USER_PROMPT}"),
            image: ImageInput::jpeg(jpeg),
            max_tokens: self.max_tokens,
        }
    }

    /// Describe one image. Returns the trimmed, non-empty description.
    ///
    /// The timeout covers the rate-limit hook and the call. On expiry the
    /// call future is dropped; the provider may still finish the request.
    pub async fn describe(&self, path: &str, jpeg: &[u8]) -> IntakeResult<String> {
        let request = self.request(path, jpeg);

        let call = async {
            self.rate_limiter
                .before_call(self.provider.name(), self.provider.model())
                .await;
            self.provider.generate(&request).await
        };

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(response)) => Self::accept(path, response),
            Ok(Err(e)) => Err(IntakeError::ModelError(e.to_string())),
            Err(_) => Err(IntakeError::ModelTimeout {
                timeout: self.timeout,
            }),
        }
    }

    fn accept(path: &str, response: LlmResponse) -> IntakeResult<String> {
        let text = response.text.trim();
        if text.is_empty() {
            return Err(IntakeError::EmptyResult);
        }
        tracing::debug!(
            "Described {path} with {} in {}ms (tokens: {:?})",
            response.model,
            response.latency_ms,
            response.tokens_used
        );
        Ok(text.to_string())
    }
}
