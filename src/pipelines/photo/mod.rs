// SPDX-License-Identifier: MPL-2.0

//! Async photo capture pipeline
//!
//! ```text
//! Frame source → Capture → Encoding → Disk I/O
//!       ↓
//! Analysis continues uninterrupted
//! ```
//!
//! The captured frame is shared through an `Arc`, so analyzers keep running
//! on the capture thread while the photo is encoded and written.

pub mod encoding;

pub use encoding::{EncodedImage, PhotoEncoder};

use crate::backends::camera::types::CameraFrame;
use crate::constants::PhotoQuality;
use crate::errors::PhotoError;
use std::path::PathBuf;
use std::sync::Arc;

/// Complete photo capture pipeline
pub struct PhotoPipeline {
    encoder: PhotoEncoder,
}

impl PhotoPipeline {
    /// Create a new photo pipeline with default settings
    pub fn new() -> Self {
        Self::with_quality(PhotoQuality::default())
    }

    pub fn with_quality(quality: PhotoQuality) -> Self {
        Self {
            encoder: PhotoEncoder::new(quality),
        }
    }

    /// Encode `frame` and save it under a timestamped name in `output_dir`
    pub async fn capture_and_save(
        &self,
        frame: Arc<CameraFrame>,
        output_dir: PathBuf,
    ) -> Result<PathBuf, PhotoError> {
        let encoded = self.encoder.encode(frame).await?;
        self.encoder.save(encoded, output_dir).await
    }

    /// Encode `frame` and save it at exactly `path`
    pub async fn capture_to(
        &self,
        frame: Arc<CameraFrame>,
        path: PathBuf,
    ) -> Result<PathBuf, PhotoError> {
        let encoded = self.encoder.encode(frame).await?;
        self.encoder.save_as(encoded, path).await
    }
}

impl Default for PhotoPipeline {
    fn default() -> Self {
        Self::new()
    }
}
