// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera frames and frame sources

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Pixel layout of a frame's primary data plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Gray8 - 8-bit luminance only (single channel)
    Gray8,
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    RGBA,
    /// YUYV - Packed 4:2:2 (Y0 U Y1 V interleaved)
    /// Common raw format from webcam sensors
    YUYV,
    /// NV12 - Semi-planar 4:2:0 (Y plane + interleaved UV plane)
    /// The primary plane is the Y plane; UV lives in `CameraFrame::chroma`
    NV12,
}

impl PixelFormat {
    /// Bytes per pixel in the primary plane
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            Self::Gray8 | Self::NV12 => 1,
            Self::YUYV => 2,
            Self::RGBA => 4,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelFormat::Gray8 => write!(f, "GRAY8"),
            PixelFormat::RGBA => write!(f, "RGBA"),
            PixelFormat::YUYV => write!(f, "YUYV"),
            PixelFormat::NV12 => write!(f, "NV12"),
        }
    }
}

/// One frame handed to the analyzers by a frame source
///
/// The source owns the buffers; analyzers borrow the frame for the duration
/// of a single call and copy whatever they need to keep.
#[derive(Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Primary data plane: luminance (Gray8/NV12), RGBA pixels, or packed YUYV
    pub data: Arc<[u8]>,
    /// Pixel format of the data
    pub format: PixelFormat,
    /// Row stride for the primary plane (bytes per row, may include padding)
    pub stride: u32,
    /// Interleaved UV plane for NV12, sharing the primary stride
    pub chroma: Option<Arc<[u8]>>,
    /// Clockwise rotation that would display the frame upright
    pub rotation_degrees: i32,
    /// When the source produced the frame
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Build a tightly packed frame (stride = width * bytes per pixel)
    pub fn new(width: u32, height: u32, format: PixelFormat, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            data: data.into(),
            format,
            stride: width.saturating_mul(format.bytes_per_pixel()),
            chroma: None,
            rotation_degrees: 0,
            captured_at: Instant::now(),
        }
    }

    /// Build a Gray8 frame from packed luminance samples
    pub fn gray8(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self::new(width, height, PixelFormat::Gray8, data)
    }

    /// Build an NV12 frame from a packed Y plane and UV plane
    pub fn nv12(width: u32, height: u32, y_plane: Vec<u8>, uv_plane: Vec<u8>) -> Self {
        let mut frame = Self::new(width, height, PixelFormat::NV12, y_plane);
        frame.chroma = Some(uv_plane.into());
        frame
    }

    /// Override the row stride (for buffers with row padding)
    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    /// Attach a rotation hint in degrees
    pub fn with_rotation(mut self, rotation_degrees: i32) -> Self {
        self.rotation_degrees = rotation_degrees;
        self
    }

    /// The primary data plane, including any row padding
    pub fn primary_plane(&self) -> &[u8] {
        &self.data
    }

    /// Re-stamp the capture time, keeping the shared pixel buffers
    pub fn restamped(&self) -> Self {
        Self {
            captured_at: Instant::now(),
            ..self.clone()
        }
    }
}

impl std::fmt::Debug for CameraFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("stride", &self.stride)
            .field("bytes", &self.data.len())
            .field("rotation_degrees", &self.rotation_degrees)
            .finish()
    }
}

/// Producer side of the capture loop
///
/// Returns `None` once the source is exhausted; the capture loop then stops.
pub trait FrameSource: Send {
    fn next_frame(&mut self) -> Option<CameraFrame>;
}

impl<I> FrameSource for I
where
    I: Iterator<Item = CameraFrame> + Send,
{
    fn next_frame(&mut self) -> Option<CameraFrame> {
        self.next()
    }
}
