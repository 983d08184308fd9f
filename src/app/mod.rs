// SPDX-License-Identifier: GPL-3.0-only

//! Main application module for the geo camera
//!
//! # Architecture
//!
//! - `state`: capture mode machine, visible-element sets, capture session
//! - `handlers`: camera, capture and export operations on [`AppModel`]
//!
//! # Control flow
//!
//! ```text
//! capture/upload ─▶ crop ─▶ enter preview ─▶ annotate location ─▶ refresh map
//!                                                 │
//!                           download ◀────────────┘ (on request)
//! retake ─▶ restart camera ─▶ enter live
//! ```
//!
//! All operations run on one task. The crop completes before the preview is
//! entered, and the preview is entered before geolocation is requested.

mod handlers;
pub mod state;

pub use state::{
    Annotation, CaptureSession, CaptureSource, Element, ModeController, ModeEffect, ModeSurface,
    UiMode,
};

use crate::backends::camera::{CameraManager, MediaDevices};
use crate::config::Config;
use crate::export::{DownloadSink, ExportComposer, ExportSettings, SnapshotRenderer};
use crate::location::geolocation::GeolocationRequest;
use crate::location::{
    GeolocationProvider, LocationAnnotator, MapController, MapOptions, MapWidget, ReverseGeocoder,
};
use crate::notify::Notifier;
use std::time::Duration;

/// The set of host collaborators the app runs against
pub trait Platform {
    type Camera: MediaDevices;
    type Geolocation: GeolocationProvider;
    type Geocoder: ReverseGeocoder;
    type Map: MapWidget;
    type Snapshot: SnapshotRenderer;
    type Downloads: DownloadSink;
}

/// Collaborator instances handed to [`AppModel::new`]
pub struct PlatformParts<P: Platform> {
    pub camera: P::Camera,
    pub geolocation: P::Geolocation,
    pub geocoder: P::Geocoder,
    pub snapshot: P::Snapshot,
    pub downloads: P::Downloads,
    pub notifier: Box<dyn Notifier>,
}

/// Application state
///
/// Owns the camera stream, the mode machine, the map widget and the current
/// capture session. A session exists exactly while the mode is preview.
pub struct AppModel<P: Platform> {
    camera: CameraManager<P::Camera>,
    mode: ModeController,
    map: MapController<P::Map>,
    annotator: LocationAnnotator<P::Geolocation, P::Geocoder>,
    exporter: ExportComposer<P::Snapshot, P::Downloads>,
    notifier: Box<dyn Notifier>,
    session: Option<CaptureSession>,
    /// Name of the upload currently selected in the file picker
    file_selection: Option<String>,
    /// When the pending map layout refresh is due
    map_refresh_at: Option<tokio::time::Instant>,
}

impl<P: Platform> AppModel<P> {
    pub fn new(parts: PlatformParts<P>, config: &Config) -> Self {
        let map_refresh_delay: Duration = config.map_refresh_delay();
        Self {
            camera: CameraManager::new(parts.camera, config.ideal_width, config.ideal_height),
            mode: ModeController::new(map_refresh_delay),
            map: MapController::new(
                config.map_container_id.clone(),
                MapOptions::from_config(config),
            ),
            annotator: LocationAnnotator::new(
                parts.geolocation,
                parts.geocoder,
                GeolocationRequest::fresh(config.geolocation_timeout()),
            )
            .with_geocode_timeout(config.geocode_timeout()),
            exporter: ExportComposer::new(
                parts.snapshot,
                parts.downloads,
                ExportSettings::from_config(config),
            ),
            notifier: parts.notifier,
            session: None,
            file_selection: None,
            map_refresh_at: None,
        }
    }

    pub fn mode(&self) -> UiMode {
        self.mode.mode()
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    pub fn camera(&self) -> &CameraManager<P::Camera> {
        &self.camera
    }

    pub fn map(&self) -> &MapController<P::Map> {
        &self.map
    }

    pub fn exporter(&self) -> &ExportComposer<P::Snapshot, P::Downloads> {
        &self.exporter
    }

    pub fn file_selection(&self) -> Option<&str> {
        self.file_selection.as_deref()
    }

    /// Push the current element visibility to a rendering surface
    pub fn apply_mode(&self, surface: &mut impl ModeSurface) {
        self.mode.apply_to(surface);
    }
}
