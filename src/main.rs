// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use colorcam::Config;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "colorcam")]
#[command(about = "Throttled luminosity metering and QR code detection on camera frames")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Config file (default: ~/.config/colorcam/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream image files as camera frames through the analyzers
    Analyze {
        /// Image files replayed in order, cyclically
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Frames per second (default from config)
        #[arg(long)]
        fps: Option<u32>,

        /// Stop after this many frames (default: until Ctrl+C)
        #[arg(long)]
        frames: Option<u64>,

        /// Rotation hint attached to every frame (0, 90, 180, 270)
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        rotation: i32,

        /// Disable the luminosity analyzer
        #[arg(long)]
        no_luminosity: bool,

        /// Disable the QR code analyzer
        #[arg(long)]
        no_qr: bool,
    },

    /// Print the average luminosity of an image
    Luma {
        input: PathBuf,
    },

    /// Detect QR codes in an image once
    Scan {
        input: PathBuf,

        /// Rotation needed to display the image upright (0, 90, 180, 270)
        #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
        rotation: i32,
    },

    /// Capture a photo from an image frame
    Photo {
        input: PathBuf,

        /// Output file or directory (default: ~/Pictures/ColorCam)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=colorcam=trace, RUST_LOG=warn
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("colorcam=info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref());

    match cli.command {
        Commands::Analyze {
            inputs,
            fps,
            frames,
            rotation,
            no_luminosity,
            no_qr,
        } => cli::analyze(
            &config,
            cli::AnalyzeOptions {
                inputs,
                fps,
                frames,
                rotation,
                luminosity: !no_luminosity,
                qr: !no_qr,
            },
        ),
        Commands::Luma { input } => cli::print_luminosity(&input),
        Commands::Scan { input, rotation } => cli::scan(&config, &input, rotation),
        Commands::Photo { input, output } => cli::take_photo(&config, &input, output),
        Commands::Config { write } => cli::show_config(&config, cli.config, write),
    }
}
