// SPDX-License-Identifier: GPL-3.0-only
//! Worker thread that pulls frames from a source and delivers them
//!
//! Frames are delivered one at a time on a single dedicated thread, so a
//! delivery callback never runs concurrently with itself. Analyzers rely on
//! this to keep their throttle state without locking.

use super::types::{CameraFrame, FrameSource};
use crate::errors::{AppError, AppResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Action returned by the delivery callback to control loop behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Keep delivering frames
    Continue,
    /// Stop the loop gracefully
    Stop,
}

/// Controller for a capture loop running in a separate thread
///
/// # Example
///
/// ```ignore
/// let controller = CaptureLoopController::start("analysis", source, |frame| {
///     analysis.deliver(&frame);
///     LoopAction::Continue
/// })?;
///
/// // Later, stop the loop
/// controller.stop();
/// ```
pub struct CaptureLoopController {
    /// Thread handle for joining
    thread_handle: Option<JoinHandle<()>>,
    /// Signal to stop the loop
    stop_signal: Arc<AtomicBool>,
    /// Frames handed to the callback so far
    delivered: Arc<AtomicU64>,
    /// Name for logging
    name: String,
}

impl CaptureLoopController {
    /// Start delivering frames from `source` to `deliver` on a new thread
    ///
    /// The loop ends when the source is exhausted, the callback returns
    /// `LoopAction::Stop`, or `stop()` is called. Fails if the thread
    /// cannot be spawned.
    pub fn start<S, F>(name: &str, mut source: S, mut deliver: F) -> AppResult<Self>
    where
        S: FrameSource + 'static,
        F: FnMut(CameraFrame) -> LoopAction + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop_signal_clone = Arc::clone(&stop_signal);
        let delivered = Arc::new(AtomicU64::new(0));
        let delivered_clone = Arc::clone(&delivered);
        let name_clone = name.to_string();

        info!(name = %name, "Starting capture loop");

        let thread_handle = thread::Builder::new()
            .name(format!("capture-{}", name))
            .spawn(move || {
                debug!(name = %name_clone, "Capture loop thread started");

                loop {
                    // Check stop signal first
                    if stop_signal_clone.load(Ordering::SeqCst) {
                        debug!(name = %name_clone, "Stop signal received");
                        break;
                    }

                    let Some(frame) = source.next_frame() else {
                        debug!(name = %name_clone, "Frame source exhausted");
                        break;
                    };

                    delivered_clone.fetch_add(1, Ordering::SeqCst);
                    if deliver(frame) == LoopAction::Stop {
                        debug!(name = %name_clone, "Loop requested stop");
                        break;
                    }
                }

                info!(
                    name = %name_clone,
                    frames = delivered_clone.load(Ordering::SeqCst),
                    "Capture loop thread exiting"
                );
            })
            .map_err(|e| {
                AppError::Other(format!("Failed to spawn capture thread {}: {}", name, e))
            })?;

        Ok(Self {
            thread_handle: Some(thread_handle),
            stop_signal,
            delivered,
            name: name.to_string(),
        })
    }

    /// Check if the loop is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Number of frames delivered so far
    pub fn frames_delivered(&self) -> u64 {
        self.delivered.load(Ordering::SeqCst)
    }

    /// Get a clone of the stop signal for external use (e.g. a Ctrl+C handler)
    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_signal)
    }

    /// Signal the loop to stop (non-blocking)
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting capture loop stop");
        self.stop_signal.store(true, Ordering::SeqCst);
    }

    /// Stop the loop and wait for the thread to finish
    pub fn stop(&mut self) {
        self.request_stop();
        self.join();
    }

    /// Wait for the thread to finish without sending stop signal
    ///
    /// Useful when the source runs dry on its own.
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            debug!(name = %self.name, "Waiting for capture loop thread to finish");
            if let Err(e) = handle.join() {
                warn!(name = %self.name, "Capture loop thread panicked: {:?}", e);
            } else {
                debug!(name = %self.name, "Capture loop thread finished");
            }
        }
    }
}

impl Drop for CaptureLoopController {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "CaptureLoopController dropped, stopping loop");
            self.stop();
        }
    }
}
