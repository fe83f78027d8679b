//! Result types handed back to the calling agent.

use serde::Serialize;

use crate::error::{IntakeError, SetupError};
use crate::pipeline::ProcessingState;

/// Text used when a batch produced neither descriptions nor errors.
pub const NO_IMAGES_PROCESSED: &str = "No images processed";

/// A successfully described image.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DescribedImage {
    pub path: String,
    pub description: String,
}

/// A path that could not be described.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PathError {
    pub path: String,
    /// Stable machine-readable error class (e.g. "not_found")
    pub kind: &'static str,
    pub message: String,
    #[serde(skip)]
    pub error: IntakeError,
}

/// Batch-level failure, filed under its reserved key.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SetupFailure {
    /// `_config` or `_init`
    pub key: &'static str,
    pub message: String,
}

/// Final outcome of one batch.
///
/// `summary` is the short human-facing status, `content` is the full report
/// that becomes the tool result.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeReport {
    pub summary: String,
    pub content: String,
    pub descriptions: Vec<DescribedImage>,
    pub errors: Vec<PathError>,
    /// Batch-level failure message, when the batch never started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_error: Option<SetupFailure>,
}

impl IntakeReport {
    /// Aggregate a finished batch.
    pub fn from_state(state: ProcessingState) -> Self {
        let (descriptions, errors, setup_error) = state.into_parts();

        let descriptions: Vec<DescribedImage> = descriptions
            .into_iter()
            .map(|(path, description)| DescribedImage { path, description })
            .collect();
        let errors: Vec<PathError> = errors
            .into_iter()
            .map(|(path, error)| PathError {
                path,
                kind: error.kind(),
                message: error.to_string(),
                error,
            })
            .collect();

        match setup_error {
            Some(setup) => Self::aborted(&setup, descriptions, errors),
            None => Self {
                summary: summarize(descriptions.len(), errors.len()),
                content: render_content(&descriptions, &errors),
                descriptions,
                errors,
                setup_error: None,
            },
        }
    }

    fn aborted(
        setup: &SetupError,
        descriptions: Vec<DescribedImage>,
        errors: Vec<PathError>,
    ) -> Self {
        let message = setup.to_string();
        Self {
            summary: message.clone(),
            content: message.clone(),
            descriptions,
            errors,
            setup_error: Some(SetupFailure {
                key: setup.state_key(),
                message,
            }),
        }
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the batch stopped before processing any path.
    pub fn is_aborted(&self) -> bool {
        self.setup_error.is_some()
    }

    /// Description for `path`, if it was described.
    pub fn description(&self, path: &str) -> Option<&str> {
        self.descriptions
            .iter()
            .find(|d| d.path == path)
            .map(|d| d.description.as_str())
    }

    /// Error recorded for `path`, if any.
    pub fn error(&self, path: &str) -> Option<&IntakeError> {
        self.errors.iter().find(|e| e.path == path).map(|e| &e.error)
    }
}

impl IntakeError {
    /// Stable identifier used in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            IntakeError::NotFound => "not_found",
            IntakeError::UnsupportedType { .. } => "unsupported_type",
            IntakeError::CapacityExceeded { .. } => "capacity_exceeded",
            IntakeError::Storage(_) => "storage",
            IntakeError::CompressionFailure(_) => "compression_failure",
            IntakeError::ModelTimeout { .. } => "model_timeout",
            IntakeError::ModelError(_) => "model_error",
            IntakeError::EmptyResult => "empty_result",
        }
    }
}

/// `"N image(s) described, M error(s)"`, omitting zero parts.
pub fn summarize(described: usize, errors: usize) -> String {
    if described == 0 && errors == 0 {
        return NO_IMAGES_PROCESSED.to_string();
    }
    let mut parts = Vec::with_capacity(2);
    if described > 0 {
        parts.push(format!("{described} image(s) described"));
    }
    if errors > 0 {
        parts.push(format!("{errors} error(s)"));
    }
    parts.join(", ")
}

fn render_content(descriptions: &[DescribedImage], errors: &[PathError]) -> String {
    let sections: Vec<String> = descriptions
        .iter()
        .map(|d| format!("## Image: {}\n{}", d.path, d.description))
        .chain(
            errors
                .iter()
                .map(|e| format!("## Error ({}): {}", e.path, e.message)),
        )
        .collect();

    if sections.is_empty() {
        NO_IMAGES_PROCESSED.to_string()
    } else {
        sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize() {
        assert_eq!(summarize(0, 0), "No images processed");
        assert_eq!(summarize(2, 0), "2 image(s) described");
        assert_eq!(summarize(0, 1), "1 error(s)");
        assert_eq!(summarize(5, 1), "5 image(s) described, 1 error(s)");
    }

    #[test]
    fn test_content_sections_descriptions_first() {
        let mut state = ProcessingState::new();
        state.record_error("missing.png", IntakeError::NotFound);
        state.record_description("a.png", "A red square.".into());

        let report = IntakeReport::from_state(state);
        assert_eq!(
            report.content(),
            "## Image: a.png\nA red square.\n\n## Error (missing.png): File not found"
        );
        assert_eq!(report.summary(), "1 image(s) described, 1 error(s)");
        assert!(!report.is_aborted());
    }

    #[test]
    fn test_empty_batch() {
        let report = IntakeReport::from_state(ProcessingState::new());
        assert_eq!(report.content(), NO_IMAGES_PROCESSED);
        assert_eq!(report.summary(), NO_IMAGES_PROCESSED);
    }

    #[test]
    fn test_setup_error_replaces_report() {
        let mut state = ProcessingState::new();
        state.record_setup_error(SetupError::ModelInit("bad key".into()));

        let report = IntakeReport::from_state(state);
        assert!(report.is_aborted());
        assert_eq!(report.content(), "Failed to initialize vision model: bad key");
        assert_eq!(report.summary(), report.content());
        assert!(report.errors.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["setup_error"]["key"], "_init");
        assert_eq!(
            json["setup_error"]["message"],
            "Failed to initialize vision model: bad key"
        );
    }

    #[test]
    fn test_json_shape() {
        let mut state = ProcessingState::new();
        state.record_error("x.txt", IntakeError::UnsupportedType { mime: None });
        let json = serde_json::to_value(IntakeReport::from_state(state)).unwrap();
        assert_eq!(json["errors"][0]["kind"], "unsupported_type");
        assert_eq!(json["errors"][0]["path"], "x.txt");
        assert!(json.get("setup_error").is_none());
    }
}
