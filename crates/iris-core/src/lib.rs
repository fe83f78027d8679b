//! Iris Core - vision intake for language-model agents.
//!
//! Iris turns a batch of image file paths into text descriptions an agent can
//! reason about. The pipeline is strictly sequential:
//!
//! ```text
//! Select model → (per path) Validate → Read → Dedup → Compress → Describe → Report
//! ```
//!
//! A batch never fails as a whole once it starts. Every path ends up either
//! described or carrying an error in the [`IntakeReport`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use iris_core::{Config, VisionIntake};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), iris_core::ConfigError> {
//!     let config = Config::load()?;
//!     let intake = VisionIntake::new(&config);
//!
//!     let report = intake.run(&["./screenshot.png".to_string()]).await;
//!     println!("{}", report.content());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod sink;
pub mod types;

// Re-exports for convenient access
pub use config::{Config, IntakeConfig, ModelConfig, ModelsConfig};
pub use error::{ConfigError, IntakeError, IntakeResult, LlmError, SetupError};
pub use output::{OutputFormat, ReportWriter};
pub use pipeline::{ProcessingState, VisionIntake};
pub use sink::{LogSink, MemorySink, Severity, TracingSink};
pub use types::{DescribedImage, IntakeReport, PathError, SetupFailure};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
