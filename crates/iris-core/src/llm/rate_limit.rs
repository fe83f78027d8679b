//! Hook for outbound rate limiting.
//!
//! The pipeline does not pace calls itself. It awaits the hook once before
//! every model call; whoever embeds the pipeline decides what that means.

use async_trait::async_trait;

#[async_trait]
pub trait RateLimitHook: Send + Sync {
    /// Called once per model call, before the request is sent.
    ///
    /// Runs inside the call's timeout budget, so a hook that waits too long
    /// turns into a timeout for that image.
    async fn before_call(&self, provider: &str, model: &str);
}

/// Hook that never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRateLimit;

#[async_trait]
impl RateLimitHook for NoRateLimit {
    async fn before_call(&self, _provider: &str, _model: &str) {}
}
