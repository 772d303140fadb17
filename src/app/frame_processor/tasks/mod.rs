// SPDX-License-Identifier: GPL-3.0-only

//! Frame processing tasks
//!
//! This module contains the analyzer abstraction invoked once per frame,
//! the detector seam for asynchronous barcode decoding, and the analyzer
//! implementations.

pub mod barcode;
pub mod luminosity;
pub mod qr_detector;

pub use barcode::BarcodeAnalyzer;
pub use luminosity::LuminosityAnalyzer;
pub use qr_detector::QrDetector;

use crate::app::frame_processor::types::{Barcode, VisionImage};
use crate::backends::camera::types::CameraFrame;
use crate::errors::{AnalyzerResult, DetectionError};
use futures::future::BoxFuture;
use tokio::task::JoinHandle;

/// Result of a detection as delivered by a detector
pub type DetectionResult = Result<Vec<Barcode>, DetectionError>;

/// Invoked by the frame source once per frame
///
/// Calls on one instance are always serialized by the caller, so
/// implementations keep their state behind `&mut self`.
pub trait FrameAnalyzer: Send {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Inspect one frame delivered at `now_ms` (milliseconds since epoch)
    ///
    /// The frame is only borrowed for the duration of the call.
    fn analyze(
        &mut self,
        frame: &CameraFrame,
        rotation_degrees: i32,
        now_ms: i64,
    ) -> AnalyzerResult<AnalysisOutcome>;
}

/// Decodes symbols from an image, asynchronously
///
/// Completion timing is up to the detector; callers must not assume results
/// arrive in submission order.
pub trait BarcodeDetector: Send + Sync {
    fn detect(&self, image: VisionImage) -> BoxFuture<'static, DetectionResult>;
}

/// What an analyzer did with a frame
#[derive(Debug)]
pub enum AnalysisOutcome {
    /// Inside the throttle window; nothing happened
    Skipped,
    /// The frame carried no samples; nothing happened
    EmptyFrame,
    /// Average luminosity of the primary plane
    Luminosity(f64),
    /// A detection was submitted and runs in the background
    Submitted(DetectionHandle),
}

/// Outcome of one background detection
#[derive(Debug, Clone)]
pub struct DetectionReport {
    /// Time the frame was submitted (milliseconds since epoch)
    pub submitted_at_ms: i64,
    pub result: DetectionResult,
}

/// Handle to a submitted detection
///
/// Dropping the handle detaches the task; the detection still runs to
/// completion and logs its result.
#[derive(Debug)]
pub struct DetectionHandle {
    submitted_at_ms: i64,
    task: JoinHandle<DetectionReport>,
}

impl DetectionHandle {
    pub(crate) fn new(submitted_at_ms: i64, task: JoinHandle<DetectionReport>) -> Self {
        Self {
            submitted_at_ms,
            task,
        }
    }

    pub fn submitted_at_ms(&self) -> i64 {
        self.submitted_at_ms
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the detection to finish
    pub async fn wait(self) -> DetectionReport {
        match self.task.await {
            Ok(report) => report,
            Err(e) => DetectionReport {
                submitted_at_ms: self.submitted_at_ms,
                result: Err(DetectionError::TaskFailed(e.to_string())),
            },
        }
    }
}
