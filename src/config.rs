// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{PhotoQuality, analysis, capture};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Name of the configuration directory under the platform config dir
const CONFIG_DIR_NAME: &str = "colorcam";

/// Name of the configuration file
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Run the luminosity analyzer on delivered frames
    pub luminosity_enabled: bool,
    /// Throttle window of the luminosity analyzer (milliseconds)
    pub luminosity_interval_ms: u64,
    /// Run the QR code analyzer on delivered frames
    pub qr_enabled: bool,
    /// Throttle window of the QR code analyzer (milliseconds)
    pub qr_interval_ms: u64,
    /// Frames are downscaled to this dimension before QR detection
    pub qr_max_dimension: u32,
    /// Delivery rate of file-backed frame sources
    pub capture_fps: u32,
    /// Output directory for photos (None = pictures dir)
    pub photo_dir: Option<PathBuf>,
    /// JPEG quality preset for photos
    pub photo_quality: PhotoQuality,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            luminosity_enabled: true,
            luminosity_interval_ms: analysis::LUMINOSITY_INTERVAL.as_millis() as u64,
            qr_enabled: true,
            qr_interval_ms: analysis::QR_INTERVAL.as_millis() as u64,
            qr_max_dimension: analysis::QR_MAX_DIMENSION,
            capture_fps: capture::DEFAULT_FPS,
            photo_dir: None,
            photo_quality: PhotoQuality::default(),
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the config from `path`, or from the default location
    ///
    /// A missing file yields the defaults. A file that cannot be read or
    /// parsed is reported and also yields the defaults, so a broken config
    /// never prevents the camera from running.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Self::default();
        }

        match Self::read(&path) {
            Ok(config) => {
                debug!(path = %path.display(), "Loaded config");
                config.sanitized()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Read and parse a config file, reporting failures
    pub fn read(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write the config as pretty-printed JSON, creating parent directories
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn luminosity_interval(&self) -> Duration {
        Duration::from_millis(self.luminosity_interval_ms)
    }

    pub fn qr_interval(&self) -> Duration {
        Duration::from_millis(self.qr_interval_ms)
    }

    /// Clamp values that would stall or break frame delivery
    fn sanitized(mut self) -> Self {
        if self.capture_fps == 0 || self.capture_fps > capture::MAX_FPS {
            warn!(
                fps = self.capture_fps,
                "Capture rate out of range, using default"
            );
            self.capture_fps = capture::DEFAULT_FPS;
        }
        if self.qr_max_dimension == 0 {
            self.qr_max_dimension = analysis::QR_MAX_DIMENSION;
        }
        self
    }
}
