// SPDX-License-Identifier: GPL-3.0-only

//! Image analysis use case
//!
//! Binds a set of analyzers to a frame source. Every frame is stamped with
//! the wall clock once and handed to each analyzer in turn on the capture
//! thread, so analyzers never see concurrent calls.

use crate::app::frame_processor::{AnalysisOutcome, FrameAnalyzer};
use crate::backends::camera::frame_loop::{CaptureLoopController, LoopAction};
use crate::backends::camera::types::{CameraFrame, FrameSource};
use crate::errors::AppResult;
use tracing::{debug, warn};

/// Source of wall-clock time in milliseconds since the epoch
pub trait Clock: Send {
    fn now_millis(&self) -> i64;
}

/// The system wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Analyzers bound to one frame stream
pub struct ImageAnalysis {
    analyzers: Vec<Box<dyn FrameAnalyzer>>,
    clock: Box<dyn Clock>,
}

impl ImageAnalysis {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            analyzers: Vec::new(),
            clock,
        }
    }

    /// Add an analyzer; analyzers run in the order they were added
    pub fn with_analyzer(mut self, analyzer: Box<dyn FrameAnalyzer>) -> Self {
        self.analyzers.push(analyzer);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    /// Hand one frame to every analyzer
    ///
    /// A failing analyzer is logged and does not keep the others from
    /// seeing the frame. Returns the successful outcomes in analyzer order.
    pub fn deliver(&mut self, frame: &CameraFrame) -> Vec<AnalysisOutcome> {
        let now_ms = self.clock.now_millis();
        let mut outcomes = Vec::with_capacity(self.analyzers.len());

        for analyzer in &mut self.analyzers {
            match analyzer.analyze(frame, frame.rotation_degrees, now_ms) {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => warn!(analyzer = analyzer.name(), error = %e, "Frame analysis failed"),
            }
        }

        outcomes
    }

    /// Run the analyzers on a dedicated thread fed by `source`
    ///
    /// Submitted detections are detached; their results only show up in the
    /// logs.
    pub fn bind<S>(mut self, source: S) -> AppResult<CaptureLoopController>
    where
        S: FrameSource + 'static,
    {
        debug!(analyzers = self.analyzers.len(), "Binding image analysis");
        CaptureLoopController::start("analysis", source, move |frame| {
            self.deliver(&frame);
            LoopAction::Continue
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::frame_processor::LuminosityAnalyzer;
    use crate::errors::{AnalyzerError, AnalyzerResult};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Clock advancing by a fixed step on every read
    struct SteppingClock {
        now: AtomicI64,
        step: i64,
    }

    impl Clock for SteppingClock {
        fn now_millis(&self) -> i64 {
            self.now.fetch_add(self.step, Ordering::SeqCst)
        }
    }

    fn stepping(step: i64) -> Box<dyn Clock> {
        Box::new(SteppingClock {
            now: AtomicI64::new(0),
            step,
        })
    }

    struct Failing;

    impl FrameAnalyzer for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn analyze(&mut self, _: &CameraFrame, _: i32, _: i64) -> AnalyzerResult<AnalysisOutcome> {
            Err(AnalyzerError::UnsupportedRotation(1))
        }
    }

    /// Records the timestamps and rotations it was called with
    struct Recording(Arc<Mutex<Vec<(i64, i32)>>>);

    impl FrameAnalyzer for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn analyze(
            &mut self,
            _: &CameraFrame,
            rotation_degrees: i32,
            now_ms: i64,
        ) -> AnalyzerResult<AnalysisOutcome> {
            self.0.lock().unwrap().push((now_ms, rotation_degrees));
            Ok(AnalysisOutcome::Skipped)
        }
    }

    #[test]
    fn test_failure_does_not_block_other_analyzers() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut analysis = ImageAnalysis::new(stepping(0))
            .with_analyzer(Box::new(Failing))
            .with_analyzer(Box::new(Recording(calls.clone())));

        let outcomes = analysis.deliver(&CameraFrame::gray8(1, 1, vec![0]).with_rotation(180));
        assert_eq!(outcomes.len(), 1);
        assert_eq!(*calls.lock().unwrap(), vec![(0, 180)]);
    }

    #[test]
    fn test_luminosity_throttles_by_clock() {
        let calls = Arc::new(Mutex::new(Vec::new()));

        // 250ms between frames: 12 frames span 2750ms -> measured at 0, 1000, 2000
        let mut analysis = ImageAnalysis::new(stepping(250))
            .with_analyzer(Box::new(LuminosityAnalyzer::new(Duration::from_secs(1))))
            .with_analyzer(Box::new(Recording(calls.clone())));

        let mut measured_at = Vec::new();
        for _ in 0..12 {
            for outcome in analysis.deliver(&CameraFrame::gray8(2, 1, vec![10, 30])) {
                if let AnalysisOutcome::Luminosity(v) = outcome {
                    assert_eq!(v, 20.0);
                    measured_at.push(calls.lock().unwrap().len());
                }
            }
        }

        // Frames seen by the recorder before each measurement
        assert_eq!(measured_at, vec![0, 4, 8]);
        assert_eq!(calls.lock().unwrap().len(), 12);
    }

    #[test]
    fn test_bind_delivers_on_worker_thread() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let analysis =
            ImageAnalysis::new(stepping(1)).with_analyzer(Box::new(Recording(calls.clone())));

        let frames = (0..4).map(|_| CameraFrame::gray8(1, 1, vec![0]).with_rotation(90));
        let mut controller = analysis.bind(frames).unwrap();
        controller.join();

        let timestamps: Vec<i64> = calls.lock().unwrap().iter().map(|(t, _)| *t).collect();
        assert_eq!(timestamps, vec![0, 1, 2, 3]);
        assert_eq!(controller.frames_delivered(), 4);
    }

    #[test]
    fn test_system_clock_is_recent() {
        // After 2020-01-01
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }
}
