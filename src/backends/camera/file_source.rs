// SPDX-License-Identifier: GPL-3.0-only

//! Frame source backed by image files
//!
//! Images are decoded once up front and replayed cyclically at a fixed
//! frame rate, standing in for a live camera feed.

use super::types::{CameraFrame, PixelFormat};
use crate::constants::file_formats;
use crate::errors::{AppError, AppResult};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Load an image file as a camera frame in the requested format
///
/// Only `Gray8` and `RGBA` can be produced from image files.
pub fn load_image_as_frame(path: &Path, format: PixelFormat) -> AppResult<CameraFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !file_formats::is_image_extension(&extension) {
        return Err(AppError::Other(format!(
            "Unsupported file format: {}",
            path.display()
        )));
    }

    let image = image::open(path)?;
    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        %format,
        "Loaded image as frame"
    );

    match format {
        PixelFormat::Gray8 => {
            let luma = image.to_luma8();
            let (width, height) = luma.dimensions();
            Ok(CameraFrame::gray8(width, height, luma.into_raw()))
        }
        PixelFormat::RGBA => {
            let rgba = image.to_rgba8();
            let (width, height) = rgba.dimensions();
            Ok(CameraFrame::new(width, height, PixelFormat::RGBA, rgba.into_raw()))
        }
        other => Err(AppError::Other(format!(
            "Cannot load image files as {}",
            other
        ))),
    }
}

/// Replays a fixed set of frames like a camera would deliver them
pub struct FileFrameSource {
    frames: Vec<CameraFrame>,
    index: usize,
    /// Frames still to deliver (None = unbounded)
    remaining: Option<u64>,
    /// Pause between frames (zero = as fast as the consumer pulls)
    frame_interval: Duration,
    last_emit: Option<Instant>,
}

impl FileFrameSource {
    /// Decode `paths` into frames delivered at `fps`
    pub fn open(paths: &[PathBuf], format: PixelFormat, fps: u32) -> AppResult<Self> {
        let frames = paths
            .iter()
            .map(|path| load_image_as_frame(path, format))
            .collect::<AppResult<Vec<_>>>()?;

        info!(count = frames.len(), fps, "Opened file frame source");
        Ok(Self::from_frames(frames, fps))
    }

    /// Replay already decoded frames at `fps` (0 disables pacing)
    pub fn from_frames(frames: Vec<CameraFrame>, fps: u32) -> Self {
        let frame_interval = if fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / fps
        };

        Self {
            frames,
            index: 0,
            remaining: None,
            frame_interval,
            last_emit: None,
        }
    }

    /// Stop after `limit` frames
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.remaining = Some(limit);
        self
    }

    /// Apply the same rotation hint to every frame
    pub fn with_rotation(mut self, rotation_degrees: i32) -> Self {
        for frame in &mut self.frames {
            frame.rotation_degrees = rotation_degrees;
        }
        self
    }

    fn pace(&mut self) {
        if let Some(last) = self.last_emit {
            let elapsed = last.elapsed();
            if elapsed < self.frame_interval {
                std::thread::sleep(self.frame_interval - elapsed);
            }
        }
        self.last_emit = Some(Instant::now());
    }
}

impl Iterator for FileFrameSource {
    type Item = CameraFrame;

    fn next(&mut self) -> Option<CameraFrame> {
        if self.frames.is_empty() || self.remaining == Some(0) {
            return None;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }

        if !self.frame_interval.is_zero() {
            self.pace();
        }

        let frame = self.frames[self.index].restamped();
        self.index = (self.index + 1) % self.frames.len();
        Some(frame)
    }
}
