// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for frame analysis
//!
//! This module provides command-line functionality for:
//! - Streaming image files through the analyzers
//! - One-shot luminosity and QR code checks
//! - Capturing photos

use colorcam::app::analysis::{ImageAnalysis, SystemClock};
use colorcam::app::frame_processor::tasks::barcode::describe_symbol;
use colorcam::app::frame_processor::tasks::luminosity::average_luminosity;
use colorcam::app::frame_processor::{
    BarcodeAnalyzer, BarcodeDetector, ImageRotation, LuminosityAnalyzer, QrDetector, VisionImage,
};
use colorcam::backends::camera::file_source::{FileFrameSource, load_image_as_frame};
use colorcam::backends::camera::types::PixelFormat;
use colorcam::constants::capture;
use colorcam::pipelines::photo::PhotoPipeline;
use colorcam::{Config, storage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Options of the `analyze` command
pub struct AnalyzeOptions {
    pub inputs: Vec<PathBuf>,
    pub fps: Option<u32>,
    pub frames: Option<u64>,
    pub rotation: i32,
    pub luminosity: bool,
    pub qr: bool,
}

/// Stream image files through the enabled analyzers
pub fn analyze(config: &Config, options: AnalyzeOptions) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;

    let mut analysis = ImageAnalysis::new(Box::new(SystemClock));
    if options.luminosity && config.luminosity_enabled {
        analysis = analysis.with_analyzer(Box::new(LuminosityAnalyzer::new(
            config.luminosity_interval(),
        )));
    }
    if options.qr && config.qr_enabled {
        let detector = Arc::new(QrDetector::with_max_dimension(config.qr_max_dimension));
        analysis = analysis.with_analyzer(Box::new(BarcodeAnalyzer::new(
            detector,
            config.qr_interval(),
            runtime.handle().clone(),
        )));
    }
    if analysis.is_empty() {
        return Err("All analyzers are disabled".into());
    }

    let fps = options.fps.unwrap_or(config.capture_fps).clamp(1, capture::MAX_FPS);
    let mut source = FileFrameSource::open(&options.inputs, PixelFormat::Gray8, fps)?
        .with_rotation(options.rotation);
    if let Some(limit) = options.frames {
        source = source.with_frame_limit(limit);
    }

    println!("Analyzing {} file(s) at {} fps (press Ctrl+C to stop)", options.inputs.len(), fps);
    let mut controller = analysis.bind(source)?;

    // Set up Ctrl+C handler
    let stop_signal = controller.stop_signal();
    ctrlc::set_handler(move || {
        stop_signal.store(true, Ordering::SeqCst);
    })?;

    while controller.is_running() {
        std::thread::sleep(Duration::from_millis(100));
    }
    controller.join();

    // Give in-flight detections a chance to report
    runtime.shutdown_timeout(capture::DETECTION_GRACE_PERIOD);

    println!("Delivered {} frame(s)", controller.frames_delivered());
    Ok(())
}

/// Print the average luminosity of one image
pub fn print_luminosity(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let frame = load_image_as_frame(input, PixelFormat::Gray8)?;
    match average_luminosity(frame.primary_plane()) {
        Some(luminosity) => println!("Average luminosity: {:.2}", luminosity),
        None => println!("Image has no pixels"),
    }
    Ok(())
}

/// Run one QR detection and print what was found
pub fn scan(
    config: &Config,
    input: &Path,
    rotation: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    let rotation = ImageRotation::from_degrees(rotation)?;
    let frame = load_image_as_frame(input, PixelFormat::Gray8)?;
    let image = VisionImage::from_frame(&frame, rotation);
    let detector = QrDetector::with_max_dimension(config.qr_max_dimension);

    let runtime = tokio::runtime::Runtime::new()?;
    let barcodes = runtime.block_on(detector.detect(image))?;

    if barcodes.is_empty() {
        println!("No codes found.");
        return Ok(());
    }

    for barcode in &barcodes {
        match describe_symbol(barcode) {
            Some(line) => println!("{}", line),
            None => println!("Other: {}", barcode.raw_value),
        }
    }
    Ok(())
}

/// Capture a photo from an image frame
pub fn take_photo(
    config: &Config,
    input: &Path,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = Arc::new(load_image_as_frame(input, PixelFormat::RGBA)?);
    println!("Capture format: {}x{}", frame.width, frame.height);

    let pipeline = PhotoPipeline::with_quality(config.photo_quality);
    let runtime = tokio::runtime::Runtime::new()?;

    let saved = match output {
        // A path that is not a directory names the file itself
        Some(path) if !path.is_dir() => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            runtime.block_on(pipeline.capture_to(frame, path))?
        }
        Some(dir) => runtime.block_on(pipeline.capture_and_save(frame, dir))?,
        None => {
            let dir = storage::output_directory(config.photo_dir.as_deref());
            runtime.block_on(pipeline.capture_and_save(frame, dir))?
        }
    };

    println!("Photo saved: {}", saved.display());
    Ok(())
}

/// Print the effective configuration, optionally persisting it
pub fn show_config(
    config: &Config,
    path: Option<PathBuf>,
    write: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(config)?);

    if write {
        let path = path
            .or_else(Config::default_path)
            .ok_or("No config directory available")?;
        config.save(&path)?;
        println!("Config written: {}", path.display());
    }
    Ok(())
}
