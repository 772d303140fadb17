// SPDX-License-Identifier: MPL-2.0

//! Frame processor module for throttled frame analysis
//!
//! This module provides analyzers that sample camera frames at intervals:
//! a luminosity meter and a barcode analyzer that runs async detection.

pub mod tasks;
pub mod throttle;
pub mod types;

pub use tasks::{
    AnalysisOutcome, BarcodeAnalyzer, BarcodeDetector, DetectionHandle, DetectionReport,
    FrameAnalyzer, LuminosityAnalyzer, QrDetector,
};
pub use throttle::Throttle;
pub use types::{Barcode, BarcodeValue, FrameRegion, ImageRotation, VisionImage, WifiEncryption};
