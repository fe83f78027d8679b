//! Vision model selection.

use crate::config::{ModelConfig, ModelsConfig};
use crate::error::SetupError;

/// Pick the first vision-capable candidate: the chat model, then the browser model.
///
/// Configs without a `vision` flag count as not vision-capable.
pub fn select_vision_model(
    models: &ModelsConfig,
) -> Result<(&'static str, &ModelConfig), SetupError> {
    models
        .candidates()
        .into_iter()
        .find(|(_, cfg)| cfg.supports_vision())
        .ok_or(SetupError::NoVisionModel)
}
