// SPDX-License-Identifier: GPL-3.0-only

//! Luminosity metering task
//!
//! Averages the bytes of a frame's primary plane at most once per throttle
//! window. For YUV frames that plane is the luminance, so the average is an
//! approximate brightness of the scene.

use super::{AnalysisOutcome, FrameAnalyzer};
use crate::app::frame_processor::throttle::Throttle;
use crate::backends::camera::types::CameraFrame;
use crate::constants::analysis::LUMINOSITY_INTERVAL;
use crate::errors::AnalyzerResult;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Arithmetic mean of all bytes, None for an empty slice
pub fn average_luminosity(data: &[u8]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let sum: u64 = data.iter().map(|&v| v as u64).sum();
    Some(sum as f64 / data.len() as f64)
}

/// Throttled brightness meter
pub struct LuminosityAnalyzer {
    throttle: Throttle,
    last_luminosity: Option<f64>,
}

impl Default for LuminosityAnalyzer {
    fn default() -> Self {
        Self::new(LUMINOSITY_INTERVAL)
    }
}

impl LuminosityAnalyzer {
    pub fn new(interval: Duration) -> Self {
        Self {
            throttle: Throttle::new(interval),
            last_luminosity: None,
        }
    }

    /// Most recent measurement
    pub fn last_luminosity(&self) -> Option<f64> {
        self.last_luminosity
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }
}

impl FrameAnalyzer for LuminosityAnalyzer {
    fn name(&self) -> &'static str {
        "luminosity"
    }

    fn analyze(
        &mut self,
        frame: &CameraFrame,
        _rotation_degrees: i32,
        now_ms: i64,
    ) -> AnalyzerResult<AnalysisOutcome> {
        if !self.throttle.is_due(now_ms) {
            trace!(now_ms, "Luminosity throttled");
            return Ok(AnalysisOutcome::Skipped);
        }

        // Empty frames leave the window open for the next one
        let Some(luminosity) = average_luminosity(frame.primary_plane()) else {
            debug!(
                width = frame.width,
                height = frame.height,
                "Empty frame, skipping luminosity"
            );
            return Ok(AnalysisOutcome::EmptyFrame);
        };

        self.throttle.mark(now_ms);
        self.last_luminosity = Some(luminosity);
        info!(luminosity, "Average luminosity: {:.2}", luminosity);

        Ok(AnalysisOutcome::Luminosity(luminosity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(data: Vec<u8>) -> CameraFrame {
        let len = data.len() as u32;
        CameraFrame::gray8(len, 1, data)
    }

    fn processed_at(analyzer: &mut LuminosityAnalyzer, times: &[i64]) -> Vec<i64> {
        let frame = frame(vec![128; 16]);
        times
            .iter()
            .copied()
            .filter(|&now| {
                matches!(
                    analyzer.analyze(&frame, 0, now),
                    Ok(AnalysisOutcome::Luminosity(_))
                )
            })
            .collect()
    }

    #[test]
    fn test_average_luminosity() {
        assert_eq!(average_luminosity(&[0, 255]), Some(127.5));
        assert_eq!(average_luminosity(&[10, 20, 30]), Some(20.0));
        assert_eq!(average_luminosity(&[]), None);
    }

    #[test]
    fn test_average_does_not_overflow() {
        let data = vec![255u8; 1 << 20];
        assert_eq!(average_luminosity(&data), Some(255.0));
    }

    #[test]
    fn test_throttles_against_last_processed_time() {
        let mut analyzer = LuminosityAnalyzer::new(Duration::from_millis(1000));
        assert_eq!(processed_at(&mut analyzer, &[0, 500, 1000, 1600]), vec![0, 1000]);
        assert_eq!(analyzer.throttle().last_processed_ms(), Some(1000));
    }

    #[test]
    fn test_skip_leaves_state_untouched() {
        let mut analyzer = LuminosityAnalyzer::new(Duration::from_millis(1000));
        analyzer.analyze(&frame(vec![10]), 0, 100).unwrap();
        let before = analyzer.throttle().clone();

        let outcome = analyzer.analyze(&frame(vec![200]), 0, 600).unwrap();
        assert!(matches!(outcome, AnalysisOutcome::Skipped));
        assert_eq!(analyzer.throttle(), &before);
        assert_eq!(analyzer.last_luminosity(), Some(10.0));
    }

    #[test]
    fn test_empty_frame_keeps_window_open() {
        let mut analyzer = LuminosityAnalyzer::default();
        let outcome = analyzer.analyze(&frame(Vec::new()), 0, 5_000).unwrap();
        assert!(matches!(outcome, AnalysisOutcome::EmptyFrame));
        assert_eq!(analyzer.throttle().last_processed_ms(), None);

        let outcome = analyzer.analyze(&frame(vec![4, 6]), 0, 5_001).unwrap();
        assert!(matches!(outcome, AnalysisOutcome::Luminosity(v) if v == 5.0));
    }

    #[test]
    fn test_averages_padding_of_primary_plane() {
        // The whole plane counts, row padding included
        let padded = CameraFrame::gray8(1, 2, vec![100, 0, 100, 0]).with_stride(2);
        let mut analyzer = LuminosityAnalyzer::default();
        let outcome = analyzer.analyze(&padded, 0, 0).unwrap();
        assert!(matches!(outcome, AnalysisOutcome::Luminosity(v) if v == 50.0));
    }
}
