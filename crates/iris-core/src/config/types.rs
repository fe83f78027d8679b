//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits applied to each intake batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Maximum number of successfully described images per batch
    pub max_images: usize,

    /// Pixel budget for the compressed image (width * height)
    pub max_pixels: u32,

    /// JPEG quality factor (1-100)
    pub quality: u8,

    /// Output token cap for each description
    pub max_description_tokens: u32,

    /// Wall-clock budget for a single model call in milliseconds
    pub vision_timeout_ms: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_images: 5,
            max_pixels: 768_000,
            quality: 75,
            max_description_tokens: 500,
            vision_timeout_ms: 30_000,
        }
    }
}

impl IntakeConfig {
    pub fn vision_timeout(&self) -> Duration {
        Duration::from_millis(self.vision_timeout_ms)
    }
}

/// Candidate model configurations, in priority order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ModelsConfig {
    /// Main agent model, preferred when it supports vision
    pub chat: Option<ModelConfig>,

    /// Browser agent model, used as the vision fallback
    pub browser: Option<ModelConfig>,
}

impl ModelsConfig {
    /// Candidates with their labels, highest priority first.
    pub fn candidates(&self) -> Vec<(&'static str, &ModelConfig)> {
        [("chat_model", &self.chat), ("browser_model", &self.browser)]
            .into_iter()
            .filter_map(|(label, cfg)| cfg.as_ref().map(|c| (label, c)))
            .collect()
    }
}

/// A single model configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Provider identifier ("ollama", "anthropic", "openai", "hyperbolic")
    pub provider: String,

    /// Provider-specific model name
    pub name: String,

    /// Whether the model accepts image input. Absent means it does not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<bool>,

    /// API endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// API key (supports ${ENV_VAR} syntax)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.2
}

impl ModelConfig {
    pub fn new(provider: &str, name: &str) -> Self {
        Self {
            provider: provider.to_string(),
            name: name.to_string(),
            vision: None,
            endpoint: None,
            api_key: None,
            temperature: default_temperature(),
        }
    }

    /// Builder-style setter for the vision flag.
    pub fn with_vision(mut self, vision: bool) -> Self {
        self.vision = Some(vision);
        self
    }

    pub fn supports_vision(&self) -> bool {
        self.vision.unwrap_or(false)
    }

    /// `provider/name`, used in log lines.
    pub fn label(&self) -> String {
        format!("{}/{}", self.provider, self.name)
    }
}

/// Outbound request pacing for model calls.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Model calls allowed per minute; 0 disables pacing
    pub requests_per_minute: u32,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
