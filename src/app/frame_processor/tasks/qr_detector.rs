// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! This module implements QR code detection using the rqrr crate.
//! Images are rotated upright, optionally downscaled, and searched for
//! QR grids, returning their positions and decoded content.

use super::{BarcodeDetector, DetectionResult};
use crate::app::frame_processor::types::{Barcode, FrameRegion, VisionImage};
use crate::constants::analysis::QR_MAX_DIMENSION;
use crate::errors::DetectionError;
use futures::FutureExt;
use futures::future::BoxFuture;
use image::GrayImage;
use image::imageops::{self, FilterType};
use tracing::{debug, trace};

/// QR code detector
///
/// Decodes QR codes locally. Optimized for real-time processing with
/// frame downscaling.
#[derive(Debug, Clone)]
pub struct QrDetector {
    /// Maximum dimension for processing (frames are downscaled to this)
    max_dimension: u32,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    /// Create a new QR detector with default settings
    pub fn new() -> Self {
        Self {
            // QR codes are typically large enough to be detected at 640px
            max_dimension: QR_MAX_DIMENSION,
        }
    }

    /// Create a QR detector with custom max dimension
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }
}

impl BarcodeDetector for QrDetector {
    fn detect(&self, image: VisionImage) -> BoxFuture<'static, DetectionResult> {
        let max_dim = self.max_dimension;

        async move {
            // Run detection in a blocking task to avoid blocking the async runtime
            tokio::task::spawn_blocking(move || detect_sync(&image, max_dim))
                .await
                .map_err(|e| DetectionError::TaskFailed(e.to_string()))?
        }
        .boxed()
    }
}

/// Downscale so neither side exceeds `max_dimension`
///
/// Returns the image to process and the factor mapping its coordinates back
/// to the input.
fn downscale(image: GrayImage, max_dimension: u32) -> (GrayImage, f32) {
    let (width, height) = image.dimensions();
    if width <= max_dimension && height <= max_dimension {
        return (image, 1.0);
    }

    let scale = (width as f32 / max_dimension as f32).max(height as f32 / max_dimension as f32);
    let new_width = ((width as f32 / scale) as u32).max(1);
    let new_height = ((height as f32 / scale) as u32).max(1);

    (
        imageops::resize(&image, new_width, new_height, FilterType::Triangle),
        scale,
    )
}

/// Synchronous QR detection (runs in blocking task)
fn detect_sync(image: &VisionImage, max_dimension: u32) -> DetectionResult {
    let start = std::time::Instant::now();

    let upright = image.upright().ok_or_else(|| {
        DetectionError::Failed(format!(
            "Image buffer of {} bytes does not match {}x{}",
            image.luma.len(),
            image.width,
            image.height
        ))
    })?;
    let (width, height) = upright.dimensions();
    if width == 0 || height == 0 {
        return Ok(Vec::new());
    }

    let (processed, scale) = downscale(upright, max_dimension);
    let (proc_width, proc_height) = processed.dimensions();
    trace!(
        proc_width,
        proc_height,
        scale,
        conversion_ms = start.elapsed().as_millis(),
        "Prepared image for QR detection"
    );

    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        proc_width as usize,
        proc_height as usize,
        |x, y| processed.get_pixel(x as u32, y as u32)[0],
    );
    let grids = prepared.detect_grids();
    trace!(count = grids.len(), "QR grids located");

    let mut barcodes = Vec::with_capacity(grids.len());
    for grid in grids {
        let content = match grid.decode() {
            Ok((_meta, content)) => content,
            Err(e) => {
                debug!(error = ?e, "Failed to decode QR code");
                continue;
            }
        };

        // Bounding box of the four grid corners, back in upright coordinates
        let xs = grid.bounds.iter().map(|p| p.x);
        let ys = grid.bounds.iter().map(|p| p.y);
        let (min_x, max_x) = (xs.clone().min().unwrap_or(0), xs.max().unwrap_or(0));
        let (min_y, max_y) = (ys.clone().min().unwrap_or(0), ys.max().unwrap_or(0));

        let to_frame = |v: i32, limit: u32| ((v.max(0) as f32 * scale) as u32).min(limit);
        let x = to_frame(min_x, width);
        let y = to_frame(min_y, height);
        let region = FrameRegion::from_pixels(
            x,
            y,
            to_frame(max_x, width) - x,
            to_frame(max_y, height) - y,
            width,
            height,
        );

        debug!(
            content = %content,
            x = region.x,
            y = region.y,
            width = region.width,
            height = region.height,
            "Detected QR code"
        );

        barcodes.push(Barcode::new(content, Some(region)));
    }

    if !barcodes.is_empty() {
        debug!(
            count = barcodes.len(),
            total_ms = start.elapsed().as_millis(),
            "QR detection found codes"
        );
    }

    Ok(barcodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::frame_processor::types::{BarcodeValue, ImageRotation};
    use qrcode::{Color, QrCode};

    /// Render `content` as a QR code with 8px modules and a 4 module quiet zone
    fn render_qr(content: &str) -> (u32, Vec<u8>) {
        let code = QrCode::new(content.as_bytes()).unwrap();
        let modules = code.width() as u32;
        let colors = code.to_colors();
        let module_px = 8;
        let quiet = 4;
        let size = (modules + 2 * quiet) * module_px;

        let mut luma = vec![255u8; (size * size) as usize];
        for y in 0..size {
            for x in 0..size {
                let mx = (x / module_px) as i64 - quiet as i64;
                let my = (y / module_px) as i64 - quiet as i64;
                if mx < 0 || my < 0 || mx >= modules as i64 || my >= modules as i64 {
                    continue;
                }
                if colors[(my as u32 * modules + mx as u32) as usize] == Color::Dark {
                    luma[(y * size + x) as usize] = 0;
                }
            }
        }
        (size, luma)
    }

    #[test]
    fn test_decodes_url_code() {
        let (size, luma) = render_qr("https://example.com");
        let image = VisionImage::from_luma(size, size, luma, ImageRotation::Rotation0);

        let barcodes = detect_sync(&image, 640).unwrap();
        assert_eq!(barcodes.len(), 1);
        assert_eq!(barcodes[0].raw_value, "https://example.com");
        assert!(matches!(barcodes[0].value, BarcodeValue::Url { .. }));

        let bounds = barcodes[0].bounds.as_ref().unwrap();
        assert!(bounds.x >= 0.0 && bounds.x + bounds.width <= 1.0);
        assert!(bounds.width > 0.5);
    }

    #[test]
    fn test_decodes_rotated_and_downscaled_code() {
        let (size, luma) = render_qr("WIFI:S:Lab;T:WPA;P:secret;;");
        let image = VisionImage::from_luma(size, size, luma, ImageRotation::Rotation180);

        let barcodes = detect_sync(&image, size / 2).unwrap();
        assert_eq!(barcodes.len(), 1);
        assert!(matches!(
            barcodes[0].value,
            BarcodeValue::NetworkCredential { .. }
        ));
    }

    #[test]
    fn test_blank_image_has_no_codes() {
        let image = VisionImage::from_luma(64, 48, vec![255; 64 * 48], ImageRotation::Rotation0);
        assert_eq!(detect_sync(&image, 640), Ok(Vec::new()));
    }

    #[test]
    fn test_mismatched_buffer_is_a_failure() {
        let image = VisionImage::from_luma(64, 48, vec![0; 10], ImageRotation::Rotation0);
        assert!(matches!(
            detect_sync(&image, 640),
            Err(DetectionError::Failed(_))
        ));
    }

    #[test]
    fn test_downscale_keeps_aspect() {
        let (scaled, scale) = downscale(GrayImage::new(1280, 640), 640);
        assert_eq!(scaled.dimensions(), (640, 320));
        assert!((scale - 2.0).abs() < f32::EPSILON);

        let (same, scale) = downscale(GrayImage::new(320, 240), 640);
        assert_eq!(same.dimensions(), (320, 240));
        assert_eq!(scale, 1.0);
    }

    #[tokio::test]
    async fn test_detect_runs_on_blocking_pool() {
        let (size, luma) = render_qr("hello");
        let image = VisionImage::from_luma(size, size, luma, ImageRotation::Rotation0);
        let barcodes = QrDetector::new().detect(image).await.unwrap();
        assert_eq!(barcodes.len(), 1);
        assert_eq!(barcodes[0].value, BarcodeValue::Other);
    }
}
