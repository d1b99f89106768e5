//! Best-effort photo downsizing before upload.
//!
//! Images larger than the configured bounds are scaled down (never up) with
//! their aspect ratio preserved and re-encoded as JPEG at a fixed quality.
//! Any decode or encode failure hands back the original file untouched:
//! compression may shrink a submission but must never lose a photo.

use super::detection::is_image_mime;
use super::types::{FileReadError, UploadedFile};
use crate::config::CompressionConfig;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError};
use thiserror::Error;
use tracing::{debug, warn};

/// Every compressed photo is re-encoded to this type.
pub const OUTPUT_MIME: &str = "image/jpeg";

#[derive(Debug, Error)]
enum CompressError {
    #[error(transparent)]
    Read(#[from] FileReadError),

    #[error(transparent)]
    Image(#[from] ImageError),
}

#[derive(Debug, Clone)]
pub struct ImageCompressor {
    bounds: CompressionConfig,
}

impl Default for ImageCompressor {
    fn default() -> Self {
        Self::new(CompressionConfig::default())
    }
}

impl ImageCompressor {
    #[must_use]
    pub fn new(bounds: CompressionConfig) -> Self {
        Self { bounds }
    }

    #[must_use]
    pub fn bounds(&self) -> CompressionConfig {
        self.bounds
    }

    /// Compress one file. Non-images pass through; failures fall back to the
    /// original.
    #[must_use]
    pub fn compress(&self, file: &UploadedFile) -> UploadedFile {
        if !is_image_mime(&file.mime_type) {
            return file.clone();
        }

        match self.try_compress(file) {
            Ok(compressed) => {
                debug!(
                    file = %file.display_name,
                    before = file.byte_size,
                    after = compressed.byte_size,
                    "photo compressed"
                );
                compressed
            }
            Err(error) => {
                warn!(
                    file = %file.display_name,
                    error = %error,
                    "compression failed, keeping original"
                );
                file.clone()
            }
        }
    }

    /// Compress files one at a time, reporting `processed / total * 100`
    /// after each one.
    pub fn compress_batch<F>(&self, files: &[UploadedFile], mut on_progress: F) -> Vec<UploadedFile>
    where
        F: FnMut(f64),
    {
        let total = files.len();
        let mut compressed = Vec::with_capacity(total);

        for (index, file) in files.iter().enumerate() {
            compressed.push(self.compress(file));
            on_progress(progress_percent(index + 1, total));
        }

        compressed
    }

    fn try_compress(&self, file: &UploadedFile) -> Result<UploadedFile, CompressError> {
        let bytes = file.read_bytes()?;
        let image = image::load_from_memory(bytes)?;

        let (width, height) = fit_within(
            image.width(),
            image.height(),
            self.bounds.max_width,
            self.bounds.max_height,
        );
        let image = if (width, height) == (image.width(), image.height()) {
            image
        } else {
            image.resize_exact(width, height, FilterType::Triangle)
        };

        // JPEG has no alpha channel.
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let mut encoded = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut encoded, self.bounds.quality);
        rgb.write_with_encoder(encoder)?;

        Ok(UploadedFile::from_bytes(
            file.display_name.clone(),
            OUTPUT_MIME,
            encoded,
        ))
    }
}

/// Target dimensions for `width`×`height` inside `max_width`×`max_height`.
/// Images already inside the bounds keep their size.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let ratio = f64::min(
        f64::from(max_width) / f64::from(width),
        f64::from(max_height) / f64::from(height),
    );
    let scaled_width = (f64::from(width) * ratio).round() as u32;
    let scaled_height = (f64::from(height) * ratio).round() as u32;

    (
        scaled_width.clamp(1, max_width.max(1)),
        scaled_height.clamp(1, max_height.max(1)),
    )
}

#[allow(clippy::cast_precision_loss)]
fn progress_percent(processed: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (processed as f64 / total as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 255) as u8, (y % 255) as u8, 128])
        }));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn decoded_dimensions(file: &UploadedFile) -> (u32, u32) {
        let image = image::load_from_memory(file.read_bytes().unwrap()).unwrap();
        (image.width(), image.height())
    }

    #[test]
    fn fit_within_never_upscales() {
        assert_eq!(fit_within(800, 600, 1200, 1200), (800, 600));
        assert_eq!(fit_within(1200, 1200, 1200, 1200), (1200, 1200));
    }

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        for (w, h) in [(2400, 1800), (1800, 2400), (5000, 1201), (1201, 10), (4032, 3024)] {
            let (nw, nh) = fit_within(w, h, 1200, 1200);
            assert!(nw <= 1200 && nh <= 1200, "{w}x{h} -> {nw}x{nh}");
            let before = f64::from(w) / f64::from(h);
            let after = f64::from(nw) / f64::from(nh);
            let tolerance = 1.0 / f64::from(nh.min(nw)) * before.max(1.0);
            assert!(
                (before - after).abs() <= tolerance + 1e-9,
                "{w}x{h} -> {nw}x{nh}"
            );
        }
        assert_eq!(fit_within(2400, 1800, 1200, 1200), (1200, 900));
    }

    #[test]
    fn oversized_image_is_scaled_and_reencoded_as_jpeg() {
        let original = UploadedFile::from_bytes("patio.png", "image/png", png_bytes(2400, 600));
        let compressed = ImageCompressor::default().compress(&original);

        assert_eq!(compressed.mime_type, OUTPUT_MIME);
        assert_eq!(compressed.display_name, "patio.png");
        assert_eq!(decoded_dimensions(&compressed), (1200, 300));
    }

    #[test]
    fn small_image_keeps_dimensions() {
        let original = UploadedFile::from_bytes("cucha.png", "image/png", png_bytes(640, 480));
        let compressed = ImageCompressor::default().compress(&original);

        assert_eq!(compressed.mime_type, OUTPUT_MIME);
        assert_eq!(decoded_dimensions(&compressed), (640, 480));
    }

    #[test]
    fn transparent_png_is_flattened() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::new(50, 40));
        let mut out = Cursor::new(Vec::new());
        rgba.write_to(&mut out, ImageFormat::Png).unwrap();
        let original = UploadedFile::from_bytes("alpha.png", "image/png", out.into_inner());

        let compressed = ImageCompressor::default().compress(&original);
        assert_eq!(compressed.mime_type, OUTPUT_MIME);
        assert_eq!(decoded_dimensions(&compressed), (50, 40));
    }

    #[test]
    fn undecodable_image_is_returned_unchanged() {
        let original = UploadedFile::from_bytes("roto.jpg", "image/jpeg", b"not a jpeg".to_vec());
        let compressed = ImageCompressor::default().compress(&original);
        assert_eq!(compressed, original);
    }

    #[test]
    fn unreadable_image_is_returned_unchanged() {
        let original = UploadedFile::unreadable("remoto.jpg", "image/jpeg", 1024);
        assert_eq!(ImageCompressor::default().compress(&original), original);
    }

    #[test]
    fn non_images_pass_through() {
        let original = UploadedFile::from_bytes("nota.txt", "text/plain", b"hola".to_vec());
        assert_eq!(ImageCompressor::default().compress(&original), original);
    }

    #[test]
    fn batch_reports_monotonic_progress() {
        let files = vec![
            UploadedFile::from_bytes("a.png", "image/png", png_bytes(10, 10)),
            UploadedFile::from_bytes("b.jpg", "image/jpeg", b"broken".to_vec()),
            UploadedFile::from_bytes("c.txt", "text/plain", b"x".to_vec()),
            UploadedFile::from_bytes("d.png", "image/png", png_bytes(20, 10)),
        ];
        let mut progress = Vec::new();
        let out = ImageCompressor::default().compress_batch(&files, |p| progress.push(p));

        assert_eq!(out.len(), 4);
        assert_eq!(progress, vec![25.0, 50.0, 75.0, 100.0]);
        assert_eq!(out[1], files[1]);
        assert_eq!(out[2], files[2]);
        assert_eq!(out[3].mime_type, OUTPUT_MIME);
    }
}
