//! Per-path validation before any bytes are read.

use crate::error::{IntakeError, IntakeResult};

use super::storage::Storage;

/// Validates candidate paths: existence through storage, type from the name.
pub struct Validator;

impl Validator {
    /// Check that `path` exists and names an image.
    ///
    /// Returns the guessed MIME type on success.
    pub async fn validate(storage: &dyn Storage, path: &str) -> IntakeResult<String> {
        if !storage.exists(path).await {
            return Err(IntakeError::NotFound);
        }
        Self::image_mime(path)
    }

    /// Infer the MIME type from the file extension only.
    ///
    /// Content is never sniffed; a PNG named `.txt` is rejected.
    pub fn image_mime(path: &str) -> IntakeResult<String> {
        let mime = mime_guess::from_path(path).first_raw();
        match mime {
            Some(m) if m.starts_with("image/") => Ok(m.to_string()),
            other => Err(IntakeError::UnsupportedType {
                mime: other.map(String::from),
            }),
        }
    }
}
