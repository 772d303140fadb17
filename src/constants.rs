// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// JPEG quality presets for photo capture
///
/// Users choose between file size and fidelity. The mapping to encoder
/// quality values is fixed so saved photos stay comparable across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhotoQuality {
    /// Smaller files, visible compression artifacts
    Low,
    /// Balanced quality and file size
    Medium,
    /// Near-lossless (default)
    #[default]
    High,
}

impl PhotoQuality {
    /// Get all preset variants for iteration
    pub const ALL: [PhotoQuality; 3] = [
        PhotoQuality::Low,
        PhotoQuality::Medium,
        PhotoQuality::High,
    ];

    /// Get display name for the preset
    pub fn display_name(&self) -> &'static str {
        match self {
            PhotoQuality::Low => "Low",
            PhotoQuality::Medium => "Medium",
            PhotoQuality::High => "High",
        }
    }

    /// JPEG encoder quality (1-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            PhotoQuality::Low => 70,
            PhotoQuality::Medium => 85,
            PhotoQuality::High => 92,
        }
    }
}

/// Analyzer throttle windows
pub mod analysis {
    use super::Duration;

    /// Minimum interval between two luminosity measurements
    pub const LUMINOSITY_INTERVAL: Duration = Duration::from_secs(1);

    /// Minimum interval between two barcode detection submissions
    pub const QR_INTERVAL: Duration = Duration::from_secs(10);

    /// Frames larger than this (in either dimension) are downscaled before QR detection
    pub const QR_MAX_DIMENSION: u32 = 640;
}

/// Frame source timing
pub mod capture {
    use super::Duration;

    /// Default delivery rate for file-backed frame sources
    pub const DEFAULT_FPS: u32 = 30;

    /// Upper bound accepted for the delivery rate
    pub const MAX_FPS: u32 = 240;

    /// Grace period for in-flight detections when the runtime shuts down
    pub const DETECTION_GRACE_PERIOD: Duration = Duration::from_secs(2);
}

/// Photo file naming
pub mod photo {
    /// chrono format for photo file names (yyyy-MM-dd-HH-mm-ss-SSS)
    pub const FILE_NAME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S-%3f";

    /// Extension appended to photo file names
    pub const PHOTO_EXTENSION: &str = ".jpg";

    /// Folder created under the pictures directory
    pub const MEDIA_FOLDER: &str = "ColorCam";
}

pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}
