//! Governor-backed pacing for model calls.

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use iris_core::config::RateLimitConfig;
use iris_core::llm::RateLimitHook;
use std::num::NonZeroU32;

/// Waits before each model call so no more than `requests_per_minute` go out.
pub struct GovernorHook {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    requests_per_minute: u32,
}

impl GovernorHook {
    pub fn new(requests_per_minute: NonZeroU32) -> Self {
        Self {
            limiter: RateLimiter::direct(Quota::per_minute(requests_per_minute)),
            requests_per_minute: requests_per_minute.get(),
        }
    }

    /// `None` when pacing is disabled (`requests_per_minute = 0`).
    pub fn from_config(config: &RateLimitConfig) -> Option<Self> {
        NonZeroU32::new(config.requests_per_minute).map(Self::new)
    }

    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }
}

#[async_trait]
impl RateLimitHook for GovernorHook {
    async fn before_call(&self, provider: &str, model: &str) {
        if self.limiter.check().is_err() {
            tracing::debug!(
                "Rate limit ({}/min) reached for {provider}/{model}, waiting",
                self.requests_per_minute
            );
            self.limiter.until_ready().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn zero_disables_pacing() {
        let config = RateLimitConfig {
            requests_per_minute: 0,
        };
        assert!(GovernorHook::from_config(&config).is_none());
    }

    #[test]
    fn from_config_keeps_rate() {
        let config = RateLimitConfig {
            requests_per_minute: 30,
        };
        let hook = GovernorHook::from_config(&config).unwrap();
        assert_eq!(hook.requests_per_minute(), 30);
    }

    #[tokio::test]
    async fn generous_limit_does_not_wait() {
        let hook = GovernorHook::new(NonZeroU32::new(6000).unwrap());
        let result = tokio::time::timeout(Duration::from_secs(1), async {
            for _ in 0..5 {
                hook.before_call("ollama", "llava").await;
            }
        })
        .await;
        assert!(result.is_ok());
    }
}
