// SPDX-License-Identifier: MPL-2.0

//! Core types for frame processing results
//!
//! These types describe what the analyzers hand to a barcode detector and
//! what comes back from it.

use crate::backends::camera::format_converters::frame_to_luma;
use crate::backends::camera::types::CameraFrame;
use crate::errors::{AnalyzerError, AnalyzerResult};
use image::{GrayImage, imageops};

/// A rectangular region within a frame
///
/// Coordinates are normalized (0.0 to 1.0) relative to the frame dimensions.
/// This allows easy transformation to screen coordinates regardless of
/// the actual frame size or display scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRegion {
    /// Left edge (0.0 = left of frame, 1.0 = right of frame)
    pub x: f32,
    /// Top edge (0.0 = top of frame, 1.0 = bottom of frame)
    pub y: f32,
    /// Width as fraction of frame width
    pub width: f32,
    /// Height as fraction of frame height
    pub height: f32,
}

impl FrameRegion {
    /// Create a frame region from pixel coordinates
    pub fn from_pixels(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        Self {
            x: x as f32 / frame_width as f32,
            y: y as f32 / frame_height as f32,
            width: width as f32 / frame_width as f32,
            height: height as f32 / frame_height as f32,
        }
    }
}

/// Clockwise rotation needed to display an image upright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRotation {
    Rotation0,
    Rotation90,
    Rotation180,
    Rotation270,
}

impl ImageRotation {
    /// Translate a rotation hint in degrees
    ///
    /// Only the four right angles are accepted; anything else is an error
    /// rather than a silent default.
    pub fn from_degrees(degrees: i32) -> AnalyzerResult<Self> {
        match degrees {
            0 => Ok(Self::Rotation0),
            90 => Ok(Self::Rotation90),
            180 => Ok(Self::Rotation180),
            270 => Ok(Self::Rotation270),
            other => Err(AnalyzerError::UnsupportedRotation(other)),
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Self::Rotation0 => 0,
            Self::Rotation90 => 90,
            Self::Rotation180 => 180,
            Self::Rotation270 => 270,
        }
    }
}

/// Owned grayscale copy of a frame, submitted to a barcode detector
///
/// The host frame cannot outlive the analyzer call, so detection always
/// works on this copy.
#[derive(Debug, Clone)]
pub struct VisionImage {
    pub width: u32,
    pub height: u32,
    /// Packed luminance, `width * height` bytes
    pub luma: Vec<u8>,
    pub rotation: ImageRotation,
}

impl VisionImage {
    /// Copy the luminance of `frame`
    pub fn from_frame(frame: &CameraFrame, rotation: ImageRotation) -> Self {
        let luma = frame_to_luma(frame);
        let width = frame.width;
        // Truncated buffers lose their trailing rows
        let height = if width == 0 {
            0
        } else {
            (luma.len() / width as usize) as u32
        };

        Self {
            width,
            height,
            luma,
            rotation,
        }
    }

    /// Build directly from packed luminance
    pub fn from_luma(width: u32, height: u32, luma: Vec<u8>, rotation: ImageRotation) -> Self {
        Self {
            width,
            height,
            luma,
            rotation,
        }
    }

    /// The image rotated upright, or None if the buffer does not match its size
    pub fn upright(&self) -> Option<GrayImage> {
        let len = (self.width as usize).checked_mul(self.height as usize)?;
        let image = GrayImage::from_raw(self.width, self.height, self.luma.get(..len)?.to_vec())?;

        Some(match self.rotation {
            ImageRotation::Rotation0 => image,
            ImageRotation::Rotation90 => imageops::rotate90(&image),
            ImageRotation::Rotation180 => imageops::rotate180(&image),
            ImageRotation::Rotation270 => imageops::rotate270(&image),
        })
    }
}

/// WiFi encryption type parsed from a network credential code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiEncryption {
    /// No security (open network)
    Open,
    /// WEP security (legacy, insecure)
    Wep,
    /// WPA/WPA2 Personal
    Wpa,
    /// WPA2 Enterprise
    Wpa2Enterprise,
    /// WPA3
    Wpa3,
}

impl WifiEncryption {
    /// Parse the `T:` field of a WIFI payload
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "WEP" => Self::Wep,
            "WPA" | "WPA2" => Self::Wpa,
            "WPA2-EAP" | "WPA3-EAP" => Self::Wpa2Enterprise,
            "WPA3" | "SAE" => Self::Wpa3,
            "NOPASS" | "" => Self::Open,
            _ => Self::Wpa, // Default to WPA for unknown
        }
    }

    /// Get display name for the encryption type
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Wep => "WEP",
            Self::Wpa => "WPA/WPA2",
            Self::Wpa2Enterprise => "Enterprise",
            Self::Wpa3 => "WPA3",
        }
    }
}

impl std::fmt::Display for WifiEncryption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Classified content of a decoded symbol
#[derive(Debug, Clone, PartialEq)]
pub enum BarcodeValue {
    /// WiFi network credentials
    NetworkCredential {
        /// Network name (SSID)
        ssid: String,
        /// Network password (None for open networks)
        password: Option<String>,
        encryption: WifiEncryption,
    },
    /// Link that can be opened in a browser
    Url { url: String },
    /// Anything else (text, contacts, phone numbers, ...)
    Other,
}

impl BarcodeValue {
    /// Classify a raw payload
    pub fn parse(content: &str) -> Self {
        let trimmed = content.trim();

        // WIFI:S:<ssid>;T:<security>;P:<password>;;
        if let Some(rest) = strip_prefix_ignore_case(trimmed, "WIFI:") {
            return Self::parse_wifi(rest);
        }

        if starts_with_ignore_case(trimmed, "http://") || starts_with_ignore_case(trimmed, "https://")
        {
            return Self::Url {
                url: trimmed.to_string(),
            };
        }

        // URLTO:<url> as written by some generators
        if let Some(rest) = strip_prefix_ignore_case(trimmed, "URLTO:") {
            return Self::Url {
                url: rest.to_string(),
            };
        }

        Self::Other
    }

    fn parse_wifi(content: &str) -> Self {
        let mut ssid = String::new();
        let mut password = None;
        let mut encryption = WifiEncryption::Open;

        for part in split_unescaped(content) {
            if let Some((key, value)) = part.split_once(':') {
                let value = unescape(value);
                match key {
                    "S" => ssid = value,
                    "P" if !value.is_empty() => password = Some(value),
                    "T" => encryption = WifiEncryption::parse(&value),
                    _ => {}
                }
            }
        }

        Self::NetworkCredential {
            ssid,
            password,
            encryption,
        }
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    starts_with_ignore_case(s, prefix).then(|| &s[prefix.len()..])
}

/// Split WIFI fields on `;` that is not escaped with a backslash
fn split_unescaped(content: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in content.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ';' => {
                parts.push(&content[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < content.len() {
        parts.push(&content[start..]);
    }

    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

fn unescape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                result.push(next);
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// A decoded symbol with its location and classified content
#[derive(Debug, Clone, PartialEq)]
pub struct Barcode {
    /// Raw content decoded from the symbol
    pub raw_value: String,
    /// Classified content
    pub value: BarcodeValue,
    /// Bounding box in normalized coordinates of the upright image
    pub bounds: Option<FrameRegion>,
}

impl Barcode {
    /// Create a detection result, classifying the raw content
    pub fn new(raw_value: String, bounds: Option<FrameRegion>) -> Self {
        let value = BarcodeValue::parse(&raw_value);
        Self {
            raw_value,
            value,
            bounds,
        }
    }
}
