// SPDX-License-Identifier: GPL-3.0-only

//! Async photo encoding
//!
//! Converts a captured frame to RGB, encodes it as JPEG and writes it to
//! disk. CPU and disk work run on blocking tasks.

use crate::backends::camera::format_converters::frame_to_rgb;
use crate::backends::camera::types::CameraFrame;
use crate::constants::PhotoQuality;
use crate::constants::photo::{FILE_NAME_FORMAT, PHOTO_EXTENSION};
use crate::errors::PhotoError;
use crate::storage;
use image::RgbImage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Encoded image data ready for saving
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// JPEG photo encoder
pub struct PhotoEncoder {
    quality: PhotoQuality,
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::new(PhotoQuality::default())
    }
}

impl PhotoEncoder {
    pub fn new(quality: PhotoQuality) -> Self {
        Self { quality }
    }

    /// Encode a frame asynchronously
    pub async fn encode(&self, frame: Arc<CameraFrame>) -> Result<EncodedImage, PhotoError> {
        info!(
            width = frame.width,
            height = frame.height,
            format = %frame.format,
            quality = ?self.quality,
            "Starting encoding"
        );

        let quality = self.quality;

        // Run encoding in background task (CPU-bound)
        tokio::task::spawn_blocking(move || {
            let rgb = RgbImage::from_raw(frame.width, frame.height, frame_to_rgb(&frame))
                .ok_or_else(|| {
                    PhotoError::EncodingFailed(format!(
                        "Frame buffer too small for {}x{}",
                        frame.width, frame.height
                    ))
                })?;
            let data = Self::encode_jpeg(&rgb, quality)?;

            debug!(size = data.len(), "Encoding complete");

            Ok::<_, PhotoError>(EncodedImage {
                data,
                width: rgb.width(),
                height: rgb.height(),
            })
        })
        .await
        .map_err(|e| PhotoError::EncodingFailed(format!("Encoding task error: {}", e)))?
    }

    /// Save encoded image to disk asynchronously
    ///
    /// Generates a timestamped filename in `output_dir`.
    pub async fn save(
        &self,
        encoded: EncodedImage,
        output_dir: PathBuf,
    ) -> Result<PathBuf, PhotoError> {
        let filepath = storage::create_new_file(&output_dir, FILE_NAME_FORMAT, PHOTO_EXTENSION);
        self.save_as(encoded, filepath).await
    }

    /// Save encoded image to an explicit path
    pub async fn save_as(
        &self,
        encoded: EncodedImage,
        filepath: PathBuf,
    ) -> Result<PathBuf, PhotoError> {
        info!(path = %filepath.display(), "Saving photo");

        // Write to disk in background task (I/O-bound)
        let filepath_clone = filepath.clone();
        tokio::task::spawn_blocking(move || std::fs::write(&filepath_clone, &encoded.data))
            .await
            .map_err(|e| PhotoError::SaveFailed(format!("Save task error: {}", e)))??;

        info!(path = %filepath.display(), "Photo saved successfully");
        Ok(filepath)
    }

    /// Encode image as JPEG
    fn encode_jpeg(image: &RgbImage, quality: PhotoQuality) -> Result<Vec<u8>, PhotoError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);

        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality.jpeg_quality());

        encoder
            .encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| PhotoError::EncodingFailed(format!("JPEG encoding failed: {}", e)))?;

        Ok(buffer)
    }
}
