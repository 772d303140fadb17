// SPDX-License-Identifier: GPL-3.0-only

//! Barcode analysis task
//!
//! At most once per throttle window, copies a frame into a [`VisionImage`]
//! and submits it to a [`BarcodeDetector`] on the async runtime. Results
//! are logged when the detection completes, which may be after later frames
//! have already been delivered.

use super::{AnalysisOutcome, BarcodeDetector, DetectionHandle, DetectionReport, FrameAnalyzer};
use crate::app::frame_processor::throttle::Throttle;
use crate::app::frame_processor::types::{Barcode, BarcodeValue, ImageRotation, VisionImage};
use crate::backends::camera::types::CameraFrame;
use crate::errors::{AnalyzerError, AnalyzerResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, trace, warn};

/// Log line for a decoded symbol, None for types that are not reported
pub fn describe_symbol(barcode: &Barcode) -> Option<String> {
    match &barcode.value {
        BarcodeValue::NetworkCredential {
            ssid,
            password,
            encryption,
        } => Some(format!(
            "{} {} {}",
            ssid,
            password.as_deref().unwrap_or(""),
            encryption
        )),
        BarcodeValue::Url { .. } => Some(format!("URL: {}", barcode.raw_value)),
        BarcodeValue::Other => None,
    }
}

fn log_report(report: &DetectionReport) {
    match &report.result {
        Ok(barcodes) => {
            debug!(
                count = barcodes.len(),
                submitted_at_ms = report.submitted_at_ms,
                "Barcode detection finished"
            );
            for line in barcodes.iter().filter_map(describe_symbol) {
                info!("{}", line);
            }
        }
        Err(e) => {
            warn!(submitted_at_ms = report.submitted_at_ms, "Error: {}", e);
        }
    }
}

/// Throttled submitter of frames to a barcode detector
pub struct BarcodeAnalyzer {
    throttle: Throttle,
    detector: Arc<dyn BarcodeDetector>,
    runtime: Handle,
}

impl BarcodeAnalyzer {
    /// Analyzer that spawns detections on `runtime`
    pub fn new(detector: Arc<dyn BarcodeDetector>, interval: Duration, runtime: Handle) -> Self {
        Self {
            throttle: Throttle::new(interval),
            detector,
            runtime,
        }
    }

    /// Analyzer bound to the runtime of the calling context
    pub fn with_current_runtime(
        detector: Arc<dyn BarcodeDetector>,
        interval: Duration,
    ) -> AnalyzerResult<Self> {
        let runtime = Handle::try_current().map_err(|_| AnalyzerError::NoRuntime)?;
        Ok(Self::new(detector, interval, runtime))
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }
}

impl FrameAnalyzer for BarcodeAnalyzer {
    fn name(&self) -> &'static str {
        "barcode"
    }

    fn analyze(
        &mut self,
        frame: &CameraFrame,
        rotation_degrees: i32,
        now_ms: i64,
    ) -> AnalyzerResult<AnalysisOutcome> {
        if !self.throttle.is_due(now_ms) {
            trace!(now_ms, "Barcode detection throttled");
            return Ok(AnalysisOutcome::Skipped);
        }

        let rotation = ImageRotation::from_degrees(rotation_degrees)?;

        if frame.primary_plane().is_empty() {
            debug!("Empty frame, skipping barcode detection");
            return Ok(AnalysisOutcome::EmptyFrame);
        }

        let image = VisionImage::from_frame(frame, rotation);
        let detection = self.detector.detect(image);
        let task = self.runtime.spawn(async move {
            let report = DetectionReport {
                submitted_at_ms: now_ms,
                result: detection.await,
            };
            log_report(&report);
            report
        });

        // The window restarts at submission: a slow or failed detection
        // must not delay the next one.
        self.throttle.mark(now_ms);
        debug!(now_ms, rotation = rotation.degrees(), "Submitted frame for barcode detection");

        Ok(AnalysisOutcome::Submitted(DetectionHandle::new(now_ms, task)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::frame_processor::tasks::DetectionResult;
    use crate::app::frame_processor::types::WifiEncryption;
    use crate::constants::analysis::QR_INTERVAL;
    use crate::errors::DetectionError;
    use futures::FutureExt;
    use futures::channel::oneshot;
    use futures::future::BoxFuture;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Detector that replays a fixed result and counts submissions
    struct FixedDetector {
        result: DetectionResult,
        calls: AtomicUsize,
        rotations: Mutex<Vec<ImageRotation>>,
    }

    impl FixedDetector {
        fn new(result: DetectionResult) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
                rotations: Mutex::new(Vec::new()),
            })
        }
    }

    impl BarcodeDetector for FixedDetector {
        fn detect(&self, image: VisionImage) -> BoxFuture<'static, DetectionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.rotations.lock().unwrap().push(image.rotation);
            futures::future::ready(self.result.clone()).boxed()
        }
    }

    /// Detector that completes only when the test says so
    struct PendingDetector {
        release: Mutex<Option<oneshot::Receiver<DetectionResult>>>,
    }

    impl BarcodeDetector for PendingDetector {
        fn detect(&self, _image: VisionImage) -> BoxFuture<'static, DetectionResult> {
            let receiver = self.release.lock().unwrap().take();
            async move {
                match receiver {
                    Some(rx) => rx
                        .await
                        .unwrap_or_else(|_| Err(DetectionError::Failed("cancelled".into()))),
                    None => Ok(Vec::new()),
                }
            }
            .boxed()
        }
    }

    fn frame() -> CameraFrame {
        CameraFrame::gray8(4, 4, vec![200; 16])
    }

    #[test]
    fn test_describe_network_credential() {
        let barcode = Barcode::new("WIFI:S:Home;T:WPA;P:hunter2;;".into(), None);
        assert_eq!(
            describe_symbol(&barcode).as_deref(),
            Some("Home hunter2 WPA/WPA2")
        );
        assert!(matches!(
            barcode.value,
            BarcodeValue::NetworkCredential {
                encryption: WifiEncryption::Wpa,
                ..
            }
        ));
    }

    #[test]
    fn test_describe_url_uses_raw_text() {
        let barcode = Barcode::new("https://example.com/a?b=c".into(), None);
        assert_eq!(
            describe_symbol(&barcode).as_deref(),
            Some("URL: https://example.com/a?b=c")
        );
    }

    #[test]
    fn test_describe_other_is_silent() {
        let barcode = Barcode::new("just some text".into(), None);
        assert_eq!(describe_symbol(&barcode), None);
    }

    #[tokio::test]
    async fn test_submits_once_per_window() {
        let detector = FixedDetector::new(Ok(Vec::new()));
        let mut analyzer = BarcodeAnalyzer::with_current_runtime(
            detector.clone(),
            Duration::from_secs(10),
        )
        .unwrap();

        let mut handles = Vec::new();
        for now in [0, 1_000, 9_999, 10_000, 15_000, 20_000] {
            if let AnalysisOutcome::Submitted(handle) = analyzer.analyze(&frame(), 90, now).unwrap()
            {
                handles.push(handle);
            }
        }

        let submitted: Vec<i64> = handles.iter().map(|h| h.submitted_at_ms()).collect();
        assert_eq!(submitted, vec![0, 10_000, 20_000]);
        assert_eq!(detector.calls.load(Ordering::SeqCst), 3);
        assert!(
            detector
                .rotations
                .lock()
                .unwrap()
                .iter()
                .all(|r| *r == ImageRotation::Rotation90)
        );

        for handle in handles {
            assert!(handle.wait().await.result.is_ok());
        }
    }

    #[tokio::test]
    async fn test_unsupported_rotation_fails_call_only() {
        let detector = FixedDetector::new(Ok(Vec::new()));
        let mut analyzer = BarcodeAnalyzer::with_current_runtime(
            detector.clone(),
            Duration::from_secs(10),
        )
        .unwrap();

        let err = analyzer.analyze(&frame(), 45, 0).unwrap_err();
        assert_eq!(err, AnalyzerError::UnsupportedRotation(45));
        assert_eq!(analyzer.throttle().last_processed_ms(), None);
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);

        // The next frame with a valid rotation is still eligible
        let outcome = analyzer.analyze(&frame(), 0, 1).unwrap();
        assert!(matches!(outcome, AnalysisOutcome::Submitted(_)));
    }

    #[tokio::test]
    async fn test_throttle_resets_on_submission_not_completion() {
        let (tx, rx) = oneshot::channel();
        let detector = Arc::new(PendingDetector {
            release: Mutex::new(Some(rx)),
        });
        let mut analyzer =
            BarcodeAnalyzer::with_current_runtime(detector, Duration::from_secs(10)).unwrap();

        let AnalysisOutcome::Submitted(handle) = analyzer.analyze(&frame(), 0, 0).unwrap() else {
            panic!("Expected a submission");
        };

        // Still pending, yet the window already started
        assert!(!handle.is_finished());
        assert_eq!(analyzer.throttle().last_processed_ms(), Some(0));
        assert!(matches!(
            analyzer.analyze(&frame(), 0, 5_000).unwrap(),
            AnalysisOutcome::Skipped
        ));

        tx.send(Err(DetectionError::Failed("no model".into())))
            .unwrap();
        let report = handle.wait().await;
        assert_eq!(report.result, Err(DetectionError::Failed("no model".into())));

        // A failed detection does not extend the window either
        assert!(matches!(
            analyzer.analyze(&frame(), 0, 10_000).unwrap(),
            AnalysisOutcome::Submitted(_)
        ));
    }

    #[tokio::test]
    async fn test_report_carries_decoded_symbols() {
        let symbols = vec![
            Barcode::new("https://example.com".into(), None),
            Barcode::new("WIFI:S:Lab;T:WEP;P:abc;;".into(), None),
        ];
        let detector = FixedDetector::new(Ok(symbols.clone()));
        let mut analyzer = BarcodeAnalyzer::with_current_runtime(detector, QR_INTERVAL).unwrap();

        let AnalysisOutcome::Submitted(handle) = analyzer.analyze(&frame(), 270, 42).unwrap() else {
            panic!("Expected a submission");
        };
        let report = handle.wait().await;
        assert_eq!(report.submitted_at_ms, 42);
        assert_eq!(report.result, Ok(symbols));
    }

    #[tokio::test]
    async fn test_empty_frame_is_not_submitted() {
        let detector = FixedDetector::new(Ok(Vec::new()));
        let mut analyzer =
            BarcodeAnalyzer::with_current_runtime(detector.clone(), QR_INTERVAL).unwrap();

        let outcome = analyzer
            .analyze(&CameraFrame::gray8(0, 0, Vec::new()), 0, 0)
            .unwrap();
        assert!(matches!(outcome, AnalysisOutcome::EmptyFrame));
        assert_eq!(detector.calls.load(Ordering::SeqCst), 0);
        assert_eq!(analyzer.throttle().last_processed_ms(), None);
    }

    #[tokio::test]
    async fn test_mismatched_frame_size_is_submitted_safely() {
        let mut frame = CameraFrame::gray8(1, 1, vec![1, 2, 3, 4]);
        frame.width = 70_000;
        frame.height = 70_000;

        let mut analyzer = BarcodeAnalyzer::with_current_runtime(
            Arc::new(crate::app::frame_processor::QrDetector::new()),
            QR_INTERVAL,
        )
        .unwrap();

        let AnalysisOutcome::Submitted(handle) = analyzer.analyze(&frame, 0, 0).unwrap() else {
            panic!("Expected a submission");
        };
        assert_eq!(handle.wait().await.result, Ok(Vec::new()));
        assert_eq!(analyzer.throttle().last_processed_ms(), Some(0));
    }

    #[test]
    fn test_requires_runtime() {
        let detector = FixedDetector::new(Ok(Vec::new()));
        assert!(matches!(
            BarcodeAnalyzer::with_current_runtime(detector, QR_INTERVAL),
            Err(AnalyzerError::NoRuntime)
        ));
    }
}
