// SPDX-License-Identifier: MPL-2.0

//! Error types for frame analysis, detection and capture

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type for a single analyzer invocation
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Frame analyzer errors
    Analyzer(AnalyzerError),
    /// Barcode detection errors
    Detection(DetectionError),
    /// Photo capture errors
    Photo(PhotoError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Errors raised synchronously by an analyzer call
///
/// These only ever fail the call that raised them; the analyzer stays usable
/// for the next frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerError {
    /// Rotation hint outside {0, 90, 180, 270}
    UnsupportedRotation(i32),
    /// No async runtime available to run the detection on
    NoRuntime,
}

/// Failures reported by a barcode detector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    /// The detector ran and rejected the image
    Failed(String),
    /// The detection task panicked or was aborted
    TaskFailed(String),
}

/// Photo capture errors
#[derive(Debug, Clone)]
pub enum PhotoError {
    /// Encoding failed
    EncodingFailed(String),
    /// Save failed
    SaveFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Analyzer(e) => write!(f, "Analyzer error: {}", e),
            AppError::Detection(e) => write!(f, "Detection error: {}", e),
            AppError::Photo(e) => write!(f, "Photo error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerError::UnsupportedRotation(degrees) => {
                write!(f, "Rotation must be 0, 90, 180, 270 (got {})", degrees)
            }
            AnalyzerError::NoRuntime => write!(f, "No async runtime available"),
        }
    }
}

impl fmt::Display for DetectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionError::Failed(msg) => write!(f, "{}", msg),
            DetectionError::TaskFailed(msg) => write!(f, "Detection task failed: {}", msg),
        }
    }
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            PhotoError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for AnalyzerError {}
impl std::error::Error for DetectionError {}
impl std::error::Error for PhotoError {}

impl From<AnalyzerError> for AppError {
    fn from(err: AnalyzerError) -> Self {
        AppError::Analyzer(err)
    }
}

impl From<DetectionError> for AppError {
    fn from(err: DetectionError) -> Self {
        AppError::Detection(err)
    }
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        AppError::Photo(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Other(format!("Image error: {}", err))
    }
}

impl From<std::io::Error> for PhotoError {
    fn from(err: std::io::Error) -> Self {
        PhotoError::SaveFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_rotation_message() {
        let err = AnalyzerError::UnsupportedRotation(45);
        assert_eq!(err.to_string(), "Rotation must be 0, 90, 180, 270 (got 45)");
    }

    #[test]
    fn test_app_error_wraps_sub_errors() {
        let err: AppError = DetectionError::Failed("model unavailable".into()).into();
        assert!(matches!(err, AppError::Detection(_)));
        assert_eq!(err.to_string(), "Detection error: model unavailable");
    }
}
