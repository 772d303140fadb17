// SPDX-License-Identifier: MPL-2.0

//! ColorCam - Throttled frame analysis for camera feeds
//!
//! This library provides the analysis core of the ColorCam application:
//! a luminosity meter and a QR code scanner, both rate limited so that a
//! camera delivering dozens of frames per second only pays for the work
//! at the configured interval.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Frame analyzers and the analysis session that drives them
//! - [`backends`]: Camera frame types and frame sources
//! - [`pipelines`]: Photo capture pipeline
//! - [`config`]: User configuration handling
//! - [`storage`]: Photo file naming and output directories
//!
//! # Example
//!
//! ```ignore
//! use colorcam::{CameraFrame, ImageAnalysis, LuminosityAnalyzer, SystemClock};
//!
//! let mut analysis = ImageAnalysis::new(Box::new(SystemClock))
//!     .with_analyzer(Box::new(LuminosityAnalyzer::default()));
//! analysis.deliver(&CameraFrame::gray8(2, 2, vec![0, 50, 100, 250]));
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use app::analysis::{Clock, ImageAnalysis, SystemClock};
pub use app::frame_processor::{
    AnalysisOutcome, Barcode, BarcodeAnalyzer, BarcodeDetector, BarcodeValue, FrameAnalyzer,
    LuminosityAnalyzer, QrDetector,
};
pub use backends::camera::types::{CameraFrame, PixelFormat};
pub use config::Config;
pub use constants::PhotoQuality;
