//! Per-batch accumulator.
//!
//! One `ProcessingState` lives exactly as long as one `VisionIntake::run` call.
//! Every stage writes to it through `&mut`; nothing else ever sees it.

use std::collections::HashSet;

use crate::error::{IntakeError, SetupError};

#[derive(Debug, Default)]
pub struct ProcessingState {
    /// path -> description, in processing order
    descriptions: Vec<(String, String)>,
    /// path -> error, in processing order
    errors: Vec<(String, IntakeError)>,
    /// Batch-level failure, filed under a reserved `_` key
    setup_error: Option<SetupError>,
    seen_hashes: HashSet<String>,
    /// Every path in `descriptions` or `errors`
    recorded: HashSet<String>,
}

impl ProcessingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `path` already has a description or an error in this batch.
    pub fn is_recorded(&self, path: &str) -> bool {
        self.recorded.contains(path)
    }

    /// Number of described images. Always equal to `descriptions().len()`.
    pub fn loaded_count(&self) -> usize {
        self.descriptions.len()
    }

    /// Store a description. Returns the new loaded count.
    pub(crate) fn record_description(&mut self, path: &str, text: String) -> usize {
        let fresh = self.recorded.insert(path.to_string());
        debug_assert!(fresh, "path recorded twice: {path}");
        self.descriptions.push((path.to_string(), text));
        self.descriptions.len()
    }

    pub(crate) fn record_error(&mut self, path: &str, error: IntakeError) {
        let fresh = self.recorded.insert(path.to_string());
        debug_assert!(fresh, "path recorded twice: {path}");
        self.errors.push((path.to_string(), error));
    }

    pub(crate) fn record_setup_error(&mut self, error: SetupError) {
        self.setup_error = Some(error);
    }

    /// Remember a content hash. Returns `false` if it was already seen.
    pub(crate) fn mark_seen(&mut self, hash: &str) -> bool {
        self.seen_hashes.insert(hash.to_string())
    }

    pub fn descriptions(&self) -> &[(String, String)] {
        &self.descriptions
    }

    /// Per-path errors; batch-level errors are reported separately.
    pub fn errors(&self) -> &[(String, IntakeError)] {
        &self.errors
    }

    pub fn setup_error(&self) -> Option<&SetupError> {
        self.setup_error.as_ref()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        Vec<(String, String)>,
        Vec<(String, IntakeError)>,
        Option<SetupError>,
    ) {
        (self.descriptions, self.errors, self.setup_error)
    }
}
