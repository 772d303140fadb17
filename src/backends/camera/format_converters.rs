// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion utilities for camera frames
//!
//! Detection wants tightly packed luminance, photo capture wants packed RGB.
//! Both strip stride padding so the output is exactly `width * height`
//! samples (times channel count).

use super::types::{CameraFrame, PixelFormat};

/// BT.601 luma from RGB
#[inline]
fn rgb_to_luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// BT.601 YUV to RGB
#[inline]
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;
    [
        (y + 1.402 * v).clamp(0.0, 255.0) as u8,
        (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8,
        (y + 1.772 * u).clamp(0.0, 255.0) as u8,
    ]
}

/// Iterate the rows of the primary plane without stride padding
///
/// Rows that would run past the end of a truncated buffer are dropped, and
/// iteration ends at the first missing row.
fn packed_rows(frame: &CameraFrame) -> impl Iterator<Item = &[u8]> {
    let row_len = (frame.width as usize).saturating_mul(frame.format.bytes_per_pixel() as usize);
    let stride = (frame.stride as usize).max(row_len);
    let data = frame.primary_plane();

    (0..frame.height as usize).map_while(move |y| {
        let start = y.checked_mul(stride)?;
        data.get(start..start.checked_add(row_len)?)
    })
}

/// Declared pixel count, capped at what the primary plane can hold
fn pixel_capacity(frame: &CameraFrame) -> usize {
    (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .min(frame.primary_plane().len())
}

/// Extract packed 8-bit luminance (`width * height` bytes)
pub fn frame_to_luma(frame: &CameraFrame) -> Vec<u8> {
    let mut luma = Vec::with_capacity(pixel_capacity(frame));

    for row in packed_rows(frame) {
        match frame.format {
            PixelFormat::Gray8 | PixelFormat::NV12 => luma.extend_from_slice(row),
            PixelFormat::RGBA => {
                luma.extend(row.chunks_exact(4).map(|p| rgb_to_luma(p[0], p[1], p[2])))
            }
            // Y0 U Y1 V: luminance sits on even bytes
            PixelFormat::YUYV => luma.extend(row.iter().step_by(2).copied()),
        }
    }

    luma
}

/// Convert a frame to packed RGB (`width * height * 3` bytes)
pub fn frame_to_rgb(frame: &CameraFrame) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(pixel_capacity(frame).saturating_mul(3));

    match frame.format {
        PixelFormat::Gray8 => {
            for row in packed_rows(frame) {
                for &y in row {
                    rgb.extend_from_slice(&[y, y, y]);
                }
            }
        }
        PixelFormat::RGBA => {
            for row in packed_rows(frame) {
                for p in row.chunks_exact(4) {
                    rgb.extend_from_slice(&p[..3]);
                }
            }
        }
        PixelFormat::YUYV => {
            for row in packed_rows(frame) {
                // Each 4-byte group encodes 2 pixels sharing U and V
                for chunk in row.chunks_exact(4) {
                    rgb.extend_from_slice(&yuv_to_rgb(chunk[0], chunk[1], chunk[3]));
                    rgb.extend_from_slice(&yuv_to_rgb(chunk[2], chunk[1], chunk[3]));
                }
            }
        }
        PixelFormat::NV12 => {
            let stride = frame.stride as usize;
            let chroma = frame.chroma.as_deref().unwrap_or(&[]);
            for (y_idx, row) in packed_rows(frame).enumerate() {
                let uv_row = (y_idx / 2) * stride;
                for (x, &luma) in row.iter().enumerate() {
                    let uv = uv_row + (x / 2) * 2;
                    // Missing chroma renders as neutral gray
                    let u = chroma.get(uv).copied().unwrap_or(128);
                    let v = chroma.get(uv + 1).copied().unwrap_or(128);
                    rgb.extend_from_slice(&yuv_to_rgb(luma, u, v));
                }
            }
        }
    }

    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_strips_stride_padding() {
        // 2x2 gray frame with 2 bytes of padding per row
        let data = vec![10u8, 20, 0, 0, 30, 40, 0, 0];
        let frame = CameraFrame::gray8(2, 2, data).with_stride(4);
        assert_eq!(frame_to_luma(&frame), vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_luma_from_yuyv_takes_even_bytes() {
        let data = vec![50u8, 128, 60, 128, 70, 128, 80, 128];
        let frame = CameraFrame::new(4, 1, PixelFormat::YUYV, data);
        assert_eq!(frame_to_luma(&frame), vec![50, 60, 70, 80]);
    }

    #[test]
    fn test_luma_from_rgba() {
        let data = vec![255u8, 255, 255, 255, 0, 0, 0, 255];
        let frame = CameraFrame::new(2, 1, PixelFormat::RGBA, data);
        assert_eq!(frame_to_luma(&frame), vec![255, 0]);
    }

    #[test]
    fn test_truncated_buffer_drops_rows() {
        let frame = CameraFrame::gray8(2, 3, vec![1, 2, 3, 4]);
        assert_eq!(frame_to_luma(&frame), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_oversized_dimensions_do_not_overflow() {
        let mut frame = CameraFrame::gray8(1, 1, vec![1, 2, 3, 4]);
        frame.width = 70_000;
        frame.height = 70_000;
        frame.stride = 70_000;
        assert!(frame_to_luma(&frame).is_empty());
        assert!(frame_to_rgb(&frame).is_empty());

        let mut rgba = CameraFrame::new(1, 1, PixelFormat::RGBA, vec![9u8; 4]);
        rgba.width = u32::MAX;
        rgba.height = u32::MAX;
        assert!(frame_to_luma(&rgba).is_empty());
    }

    #[test]
    fn test_nv12_neutral_chroma_is_gray() {
        let frame = CameraFrame::nv12(2, 2, vec![100; 4], vec![128, 128]);
        let rgb = frame_to_rgb(&frame);
        assert_eq!(rgb.len(), 12);
        assert!(rgb.iter().all(|&c| c == 100));
    }
}
