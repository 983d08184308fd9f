// SPDX-License-Identifier: GPL-3.0-only

use clap::{Args, Parser, Subcommand};
use geocam::ViewRect;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "geocam")]
#[command(about = "Viewport-matched photos with a location overlay")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crop an image to a viewfinder aspect ratio
    Crop {
        /// Image to crop
        #[arg(short, long)]
        input: PathBuf,

        /// Viewfinder size, e.g. 360x640
        #[arg(short, long, value_parser = parse_view)]
        view: ViewRect,

        /// Mirror horizontally after cropping (front camera)
        #[arg(short, long)]
        mirror: bool,

        /// Output file path (default: <input>_crop.jpg next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Capture a frame from an image file acting as the camera, then export
    Capture {
        #[command(flatten)]
        flow: FlowArgs,

        /// Use the front (mirrored) camera
        #[arg(long)]
        front: bool,
    },

    /// Annotate and export an uploaded image
    Upload {
        #[command(flatten)]
        flow: FlowArgs,
    },

    /// Print the overlay timestamp and file token for now
    Time,
}

/// Options shared by the capture and upload flows
#[derive(Args)]
pub struct FlowArgs {
    /// Source image
    #[arg(short, long)]
    pub input: PathBuf,

    /// Viewfinder size, e.g. 360x640
    #[arg(short, long, value_parser = parse_view)]
    pub view: ViewRect,

    /// Latitude of the device position
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude of the device position
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Skip the address lookup
    #[arg(long)]
    pub offline: bool,

    /// Directory for the exported composite (default: from config)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

fn parse_view(s: &str) -> Result<ViewRect, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let width: f64 = w.trim().parse().map_err(|_| format!("invalid width '{}'", w))?;
    let height: f64 = h.trim().parse().map_err(|_| format!("invalid height '{}'", h))?;
    if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
        return Err(format!("invalid view size '{}'", s));
    }
    Ok(ViewRect::new(width, height))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=geocam=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Crop {
            input,
            view,
            mirror,
            output,
        } => cli::crop_image(&input, view, mirror, output),
        Commands::Capture { flow, front } => cli::capture_photo(flow, front),
        Commands::Upload { flow } => cli::upload_photo(flow),
        Commands::Time => cli::print_time(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view() {
        let view = parse_view("360x640").unwrap();
        assert_eq!((view.width, view.height), (360.0, 640.0));
        assert_eq!(parse_view("1920X1080").unwrap().width, 1920.0);
        assert!(parse_view("360").is_err());
        assert!(parse_view("axb").is_err());
        assert!(parse_view("-1x5").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
