//! Batch orchestration: select a model, then walk the paths one at a time.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{Config, IntakeConfig, ModelsConfig};
use crate::error::{IntakeError, IntakeResult, SetupError};
use crate::llm::{
    select_vision_model, LlmProvider, LlmProviderFactory, ModelFactory, NoRateLimit,
    RateLimitHook,
};
use crate::sink::{LogSink, Severity, TracingSink};
use crate::types::IntakeReport;

use super::compress::{compress_blocking, ImageCodec, JpegCodec};
use super::describe::Describer;
use super::hash::Hasher;
use super::state::ProcessingState;
use super::storage::{LocalStorage, Storage};
use super::validate::Validator;

const PREVIEW_CHARS: usize = 200;

/// What happened to a path that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathOutcome {
    Described,
    DuplicateContent,
}

/// The image intake pipeline.
///
/// Holds only immutable collaborators; all per-batch state lives inside
/// [`VisionIntake::run`], so one instance can serve many batches.
pub struct VisionIntake {
    models: ModelsConfig,
    limits: IntakeConfig,
    factory: Arc<dyn ModelFactory>,
    storage: Arc<dyn Storage>,
    codec: Arc<dyn ImageCodec>,
    sink: Arc<dyn LogSink>,
    rate_limiter: Arc<dyn RateLimitHook>,
}

impl VisionIntake {
    /// Pipeline over local files, HTTP providers, and `tracing` output.
    pub fn new(config: &Config) -> Self {
        Self {
            models: config.models.clone(),
            limits: config.intake.clone(),
            factory: Arc::new(LlmProviderFactory),
            storage: Arc::new(LocalStorage::new()),
            codec: Arc::new(JpegCodec),
            sink: Arc::new(TracingSink),
            rate_limiter: Arc::new(NoRateLimit),
        }
    }

    pub fn with_factory(mut self, factory: Arc<dyn ModelFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimitHook>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn limits(&self) -> &IntakeConfig {
        &self.limits
    }

    /// Process one batch. Never fails; every problem ends up in the report.
    pub async fn run(&self, paths: &[String]) -> IntakeReport {
        let start = Instant::now();
        let mut state = ProcessingState::new();
        self.run_into(paths, &mut state).await;
        tracing::debug!(
            "Batch of {} path(s) finished in {:?}",
            paths.len(),
            start.elapsed()
        );
        IntakeReport::from_state(state)
    }

    async fn run_into(&self, paths: &[String], state: &mut ProcessingState) {
        let provider = match self.prepare_model() {
            Ok(provider) => provider,
            Err(e) => {
                self.sink.log(Severity::Warning, &e.to_string());
                state.record_setup_error(e);
                return;
            }
        };

        let describer = Describer::new(
            provider.as_ref(),
            self.rate_limiter.as_ref(),
            self.limits.max_description_tokens,
            self.limits.vision_timeout(),
        );

        for path in paths {
            // Repeated path strings are dropped without a trace in the report.
            if state.is_recorded(path) {
                tracing::debug!("Already handled in this batch: {path}");
                continue;
            }

            match self.process_path(path, &describer, state).await {
                Ok(outcome) => tracing::trace!("  {path}: {outcome:?}"),
                Err(e) => {
                    self.sink.log(Severity::Warning, &self.failure_message(path, &e));
                    state.record_error(path, e);
                }
            }
        }
    }

    /// Select a vision-capable config and build its provider.
    fn prepare_model(&self) -> Result<Box<dyn LlmProvider>, SetupError> {
        let (label, config) = select_vision_model(&self.models)?;
        let provider = self.factory.create(config)?;
        tracing::info!("Using {label} '{}' for image descriptions", config.label());
        Ok(provider)
    }

    async fn process_path(
        &self,
        path: &str,
        describer: &Describer<'_>,
        state: &mut ProcessingState,
    ) -> IntakeResult<PathOutcome> {
        let start = Instant::now();

        if state.loaded_count() >= self.limits.max_images {
            return Err(IntakeError::CapacityExceeded {
                max: self.limits.max_images,
            });
        }

        Validator::validate(self.storage.as_ref(), path).await?;

        let bytes = self
            .storage
            .read_all_bytes(path)
            .await
            .map_err(|e| IntakeError::Storage(e.to_string()))?;
        tracing::trace!("  Read {} bytes: {:?}", bytes.len(), start.elapsed());

        let content_hash = Hasher::content_hash(&bytes);
        if !state.mark_seen(&content_hash) {
            self.sink.log(
                Severity::Info,
                &format!(
                    "Skipping duplicate image: {path} (hash: {})",
                    Hasher::short(&content_hash)
                ),
            );
            return Ok(PathOutcome::DuplicateContent);
        }

        let compress_start = Instant::now();
        let compressed = compress_blocking(
            self.codec.clone(),
            bytes,
            self.limits.max_pixels,
            self.limits.quality,
        )
        .await?;
        tracing::trace!("  Compress: {:?}", compress_start.elapsed());

        let describe_start = Instant::now();
        let description = describer.describe(path, &compressed).await?;
        tracing::trace!("  Describe: {:?}", describe_start.elapsed());

        self.sink.log(
            Severity::Info,
            &format!(
                "Described: {path} ({}KB compressed)\n   {}",
                compressed.len() / 1024,
                preview(&description)
            ),
        );
        state.record_description(path, description);

        Ok(PathOutcome::Described)
    }

    fn failure_message(&self, path: &str, error: &IntakeError) -> String {
        match error {
            IntakeError::CapacityExceeded { max } => {
                format!("Max images limit ({max}) reached, skipping: {path}")
            }
            IntakeError::ModelTimeout { .. } => format!("{error} for: {path}"),
            IntakeError::ModelError(message) => {
                format!("Vision model error for {path}: {message}")
            }
            _ => format!("Error processing image {path}: {error}"),
        }
    }
}

/// First 200 characters of a description, with an ellipsis when cut.
fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
