// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for the geo camera
//!
//! This module provides command-line functionality for:
//! - Cropping an image to a viewfinder ratio
//! - Running the capture and upload flows against local files
//! - Printing overlay timestamps

use crate::FlowArgs;
use geocam::app::{AppModel, Platform, PlatformParts};
use geocam::backends::camera::FileCamera;
use geocam::errors::{GeocodeError, LocationError};
use geocam::export::{DirectoryDownloads, ExportOutcome, RasterSnapshot};
use geocam::location::{
    AnnotationOutcome, Coordinate, FixedGeolocation, GeocodeResult, NominatimGeocoder,
    ReverseGeocoder, TileMap,
};
use geocam::notify::TracingNotifier;
use geocam::pipelines::photo::{PhotoEncoder, crop_to_viewport};
use geocam::{Config, ViewRect, time_format};
use std::path::{Path, PathBuf};

/// Collaborators used from the command line
struct CliPlatform;

impl Platform for CliPlatform {
    type Camera = FileCamera;
    type Geolocation = FixedGeolocation;
    type Geocoder = CliGeocoder;
    type Map = TileMap;
    type Snapshot = RasterSnapshot;
    type Downloads = DirectoryDownloads;
}

/// Nominatim, or nothing when running offline
enum CliGeocoder {
    Nominatim(NominatimGeocoder),
    Offline,
}

impl ReverseGeocoder for CliGeocoder {
    async fn resolve(&self, coordinate: Coordinate) -> Result<GeocodeResult, GeocodeError> {
        match self {
            Self::Nominatim(geocoder) => geocoder.resolve(coordinate).await,
            Self::Offline => Err(GeocodeError::Network("offline mode".to_string())),
        }
    }
}

/// Crop an image to the viewfinder ratio and save it as JPEG
pub fn crop_image(
    input: &Path,
    view: ViewRect,
    mirror: bool,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let source = image::open(input)?.to_rgba8();
    println!(
        "Source: {}x{} ({})",
        source.width(),
        source.height(),
        input.display()
    );

    let cropped = crop_to_viewport(&source, view, mirror);
    let encoded = PhotoEncoder::encode_jpeg(&cropped, config.export_jpeg_quality)?;

    let output = output.unwrap_or_else(|| default_crop_path(input));
    std::fs::write(&output, &encoded.data)?;
    println!(
        "Cropped to {}x{}: {}",
        encoded.width,
        encoded.height,
        output.display()
    );

    Ok(())
}

/// How the flow reaches preview mode
enum FlowKind {
    /// Live capture; `front` flips to the mirrored front camera first
    Capture { front: bool },
    Upload,
}

/// Capture a frame from `flow.input` acting as the live camera, then export
pub fn capture_photo(flow: FlowArgs, front: bool) -> Result<(), Box<dyn std::error::Error>> {
    run_flow(flow, FlowKind::Capture { front })
}

/// Annotate and export `flow.input` as an uploaded image
pub fn upload_photo(flow: FlowArgs) -> Result<(), Box<dyn std::error::Error>> {
    run_flow(flow, FlowKind::Upload)
}

/// Print the overlay timestamp and the export file token for now
pub fn print_time() -> Result<(), Box<dyn std::error::Error>> {
    println!("Display time: {}", time_format::display_time_now());
    println!("File token:   {}", time_format::file_token_now());
    Ok(())
}

fn run_flow(flow: FlowArgs, kind: FlowKind) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load();
    if let Some(dir) = flow.output_dir.clone() {
        config.export_dir = Some(dir);
    }

    let geolocation = match (flow.lat, flow.lon) {
        (Some(lat), Some(lon)) => FixedGeolocation::at(Coordinate::new(lat, lon)?),
        _ => FixedGeolocation::failing(LocationError::PositionUnavailable),
    };
    let geocoder = if flow.offline {
        CliGeocoder::Offline
    } else {
        CliGeocoder::Nominatim(NominatimGeocoder::new(
            &config.geocoder_url,
            &config.user_agent,
            config.geocode_timeout(),
        )?)
    };

    let parts = PlatformParts::<CliPlatform> {
        camera: FileCamera::new(&flow.input),
        geolocation,
        geocoder,
        snapshot: RasterSnapshot,
        downloads: DirectoryDownloads::new(config.export_directory()),
        notifier: Box::new(TracingNotifier),
    };

    // Everything runs on one thread, like the UI it stands in for
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_app(AppModel::new(parts, &config), &flow, kind))
}

async fn run_app(
    mut app: AppModel<CliPlatform>,
    flow: &FlowArgs,
    kind: FlowKind,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = match kind {
        FlowKind::Capture { front } => {
            app.start_camera().await?;
            if front {
                app.switch_camera().await?;
            }
            println!(
                "Camera: {} ({})",
                flow.input.display(),
                app.camera().facing()
            );
            app.capture(flow.view).await?
        }
        FlowKind::Upload => {
            println!("Upload: {}", flow.input.display());
            app.upload_file(&flow.input, flow.view).await?
        }
    };
    print_annotation(&app, &outcome);

    match app.download().await {
        Some(ExportOutcome::Delivered(path)) => {
            println!("Saved: {}", path.display());
            Ok(())
        }
        Some(ExportOutcome::Failed(message)) => Err(message.into()),
        Some(ExportOutcome::Busy) | None => Err("Nothing to export".into()),
    }
}

fn print_annotation(app: &AppModel<CliPlatform>, outcome: &AnnotationOutcome) {
    let Some(session) = app.session() else {
        return;
    };
    let annotation = &session.annotation;
    let (width, height) = session.cropped().dimensions();

    println!("Capture:     {}x{}", width, height);
    println!("Header:      {}", annotation.header);
    println!("Address:     {}", annotation.address);
    if !annotation.coordinates.is_empty() {
        println!("Coordinates: {}", annotation.coordinates);
    }
    println!("Time:        {}", annotation.time);
    if let Some(map) = app.map().widget() {
        println!("Map tile:    {}", map.center_tile_url());
    }

    match outcome {
        AnnotationOutcome::Resolved => {}
        AnnotationOutcome::CoordinatesOnly(e) => eprintln!("Address lookup failed: {}", e),
        AnnotationOutcome::NoLocation(e) => eprintln!("No location: {}", e),
    }
}

fn default_crop_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{}_crop.jpg", stem))
}
