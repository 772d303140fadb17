// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for locating and naming photo files

use crate::constants::photo::MEDIA_FOLDER;
use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Path for a new file in `folder`, named after the current local time
///
/// `format` is a chrono format string; `extension` includes the dot.
pub fn create_new_file(folder: &Path, format: &str, extension: &str) -> PathBuf {
    file_name_at(folder, format, extension, &Local::now())
}

/// Same as [`create_new_file`] for a fixed point in time
pub fn file_name_at<Tz>(folder: &Path, format: &str, extension: &str, time: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    folder.join(format!("{}{}", time.format(format), extension))
}

/// Resolve the directory photos are written to
///
/// Uses `preferred` when given, otherwise `<pictures>/ColorCam`. When that
/// directory cannot be created, falls back to the application data
/// directory and finally the working directory.
pub fn output_directory(preferred: Option<&Path>) -> PathBuf {
    let media_dir = preferred
        .map(Path::to_path_buf)
        .or_else(|| dirs::picture_dir().map(|dir| dir.join(MEDIA_FOLDER)));

    if let Some(dir) = media_dir {
        match std::fs::create_dir_all(&dir) {
            Ok(()) if dir.is_dir() => {
                debug!(path = %dir.display(), "Photo directory ready");
                return dir;
            }
            Ok(()) => {}
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Cannot create photo directory")
            }
        }
    }

    let fallback = dirs::data_dir()
        .map(|dir| dir.join("colorcam"))
        .filter(|dir| std::fs::create_dir_all(dir).is_ok())
        .unwrap_or_else(|| PathBuf::from("."));
    debug!(path = %fallback.display(), "Using fallback photo directory");
    fallback
}
