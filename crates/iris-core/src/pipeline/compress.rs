//! Image normalization: decode anything the `image` crate reads, cap the
//! pixel count, re-encode as JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::GenericImageView;
use std::io::Cursor;
use std::sync::Arc;

use crate::error::{IntakeError, IntakeResult};

/// Turns raw file bytes into a bounded-size encoded image.
pub trait ImageCodec: Send + Sync {
    fn compress(&self, bytes: &[u8], max_pixels: u32, quality: u8) -> IntakeResult<Vec<u8>>;
}

/// JPEG codec backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec;

impl JpegCodec {
    /// Dimensions scaled down uniformly so `w * h <= max_pixels`.
    ///
    /// Images already within budget keep their size.
    pub fn fit_dimensions(width: u32, height: u32, max_pixels: u32) -> (u32, u32) {
        let pixels = u64::from(width) * u64::from(height);
        if pixels <= u64::from(max_pixels) || pixels == 0 {
            return (width, height);
        }
        let scale = (f64::from(max_pixels) / pixels as f64).sqrt();
        let w = ((f64::from(width) * scale).floor() as u32).max(1);
        let h = ((f64::from(height) * scale).floor() as u32).max(1);
        (w, h)
    }
}

impl ImageCodec for JpegCodec {
    fn compress(&self, bytes: &[u8], max_pixels: u32, quality: u8) -> IntakeResult<Vec<u8>> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| IntakeError::CompressionFailure(format!("Cannot detect format: {e}")))?;
        let image = reader
            .decode()
            .map_err(|e| IntakeError::CompressionFailure(e.to_string()))?;

        let (width, height) = image.dimensions();
        let (w, h) = Self::fit_dimensions(width, height, max_pixels);
        let image = if (w, h) != (width, height) {
            tracing::trace!("  Resize {width}x{height} -> {w}x{h}");
            image.resize_exact(w, h, FilterType::Lanczos3)
        } else {
            image
        };

        // JPEG has no alpha channel
        let rgb = image.to_rgb8();

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
            .encode_image(&rgb)
            .map_err(|e| IntakeError::CompressionFailure(format!("JPEG encode failed: {e}")))?;
        Ok(out)
    }
}

/// Run a codec on the blocking pool so decode/resize never stalls the runtime.
pub(crate) async fn compress_blocking(
    codec: Arc<dyn ImageCodec>,
    bytes: Vec<u8>,
    max_pixels: u32,
    quality: u8,
) -> IntakeResult<Vec<u8>> {
    tokio::task::spawn_blocking(move || codec.compress(&bytes, max_pixels, quality))
        .await
        .map_err(|e| IntakeError::CompressionFailure(format!("Task join error: {e}")))?
}
