//! Error types for the Iris intake pipeline.
//!
//! Errors are split by blast radius: [`SetupError`] aborts a whole batch before
//! any image is touched, [`IntakeError`] is confined to a single path and is
//! recorded in the batch report while processing continues.

use std::time::Duration;
use thiserror::Error;

/// Configuration-file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Batch-level failures. Any of these stops the batch before the first path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// Neither the chat nor the browser model is flagged as vision-capable
    #[error(
        "No vision-capable model configured (neither chat_model nor browser_model \
         has vision=True). Cannot describe images."
    )]
    NoVisionModel,

    /// The selected model config could not be turned into a provider
    #[error("Failed to initialize vision model: {0}")]
    ModelInit(String),
}

impl SetupError {
    /// Reserved state key the error is filed under.
    ///
    /// Keys starting with `_` never collide with a path the caller supplied
    /// and are left out of the per-path sections of the report.
    pub fn state_key(&self) -> &'static str {
        match self {
            SetupError::NoVisionModel => "_config",
            SetupError::ModelInit(_) => "_init",
        }
    }
}

/// Per-path failures. Recorded against the offending path; the batch moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    /// Storage reports the path absent
    #[error("File not found")]
    NotFound,

    /// Extension does not map to an `image/*` MIME type
    #[error("Not an image file (mime: {})", .mime.as_deref().unwrap_or("None"))]
    UnsupportedType { mime: Option<String> },

    /// The batch already described `max` images
    #[error("Skipped: max images limit ({max}) reached")]
    CapacityExceeded { max: usize },

    /// Storage failed while reading bytes
    #[error("Failed to read image: {0}")]
    Storage(String),

    /// The codec rejected the bytes
    #[error("Compression failed: {0}")]
    CompressionFailure(String),

    /// The model call ran past its time budget
    #[error("Vision model timed out ({timeout:?})")]
    ModelTimeout { timeout: Duration },

    /// The provider returned an error; holds the provider's message as-is
    #[error("{0}")]
    ModelError(String),

    /// The provider answered with blank text
    #[error("Vision model returned empty description")]
    EmptyResult,
}

/// Error raised by an LLM provider call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct LlmError {
    pub message: String,
    /// HTTP status code, when the failure came from an HTTP response
    pub status_code: Option<u16>,
}

impl LlmError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            status_code: Some(status_code),
        }
    }
}

/// Convenience type alias for per-path stage results.
pub type IntakeResult<T> = std::result::Result<T, IntakeError>;
