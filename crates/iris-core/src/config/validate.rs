//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::{Config, ModelConfig};

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.intake.max_images == 0 {
            return Err(ConfigError::ValidationError(
                "intake.max_images must be > 0".into(),
            ));
        }
        if self.intake.max_pixels == 0 {
            return Err(ConfigError::ValidationError(
                "intake.max_pixels must be > 0".into(),
            ));
        }
        if self.intake.quality == 0 || self.intake.quality > 100 {
            return Err(ConfigError::ValidationError(
                "intake.quality must be between 1 and 100".into(),
            ));
        }
        if self.intake.max_description_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "intake.max_description_tokens must be > 0".into(),
            ));
        }
        if self.intake.vision_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "intake.vision_timeout_ms must be > 0".into(),
            ));
        }
        if let Some(chat) = &self.models.chat {
            validate_model("models.chat", chat)?;
        }
        if let Some(browser) = &self.models.browser {
            validate_model("models.browser", browser)?;
        }
        Ok(())
    }
}

fn validate_model(section: &str, model: &ModelConfig) -> Result<(), ConfigError> {
    if model.provider.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{section}.provider must not be empty"
        )));
    }
    if model.name.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{section}.name must not be empty"
        )));
    }
    Ok(())
}
