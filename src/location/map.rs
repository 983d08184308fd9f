// SPDX-License-Identifier: GPL-3.0-only

//! Mini map widget
//!
//! Widget construction is expensive, so the controller builds it once on the
//! first fix and afterwards only re-centers it and moves the marker.

use super::Coordinate;
use crate::config::Config;
use tokio::sync::watch;
use tracing::{debug, info};

/// Latitude limit of the Web Mercator projection
const MERCATOR_MAX_LAT: f64 = 85.051_128_78;

/// Construction options passed to the map collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub tile_url_template: String,
    pub subdomains: Vec<String>,
    pub zoom: u8,
    pub zoom_control: bool,
    pub attribution_control: bool,
    /// Fractional zoom step (0 = no snapping)
    pub zoom_snap: f64,
    /// Tiles are fetched with CORS so the snapshot can include them
    pub cross_origin: bool,
}

impl MapOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            tile_url_template: config.tile_url_template.clone(),
            subdomains: config.tile_subdomains.clone(),
            zoom: config.map_zoom,
            zoom_control: false,
            attribution_control: false,
            zoom_snap: 0.0,
            cross_origin: true,
        }
    }
}

impl Default for MapOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Map-rendering collaborator
pub trait MapWidget {
    /// Mount a new widget centered on `center`
    fn construct(container_id: &str, options: &MapOptions, center: Coordinate) -> Self
    where
        Self: Sized;

    fn set_view(&mut self, center: Coordinate, zoom: u8);

    fn set_marker(&mut self, position: Coordinate);

    /// Recompute layout after the container changed size or visibility
    fn invalidate_layout(&mut self);

    /// Signal that flips to `true` once visible tiles are positioned
    ///
    /// Widgets that cannot tell return `None`; exports then fall back to a
    /// fixed settle delay.
    fn tiles_ready(&self) -> Option<watch::Receiver<bool>> {
        None
    }
}

/// Owns the single map widget instance
#[derive(Debug)]
pub struct MapController<M: MapWidget> {
    container_id: String,
    options: MapOptions,
    widget: Option<M>,
}

impl<M: MapWidget> MapController<M> {
    pub fn new(container_id: impl Into<String>, options: MapOptions) -> Self {
        Self {
            container_id: container_id.into(),
            options,
            widget: None,
        }
    }

    pub fn widget(&self) -> Option<&M> {
        self.widget.as_ref()
    }

    /// Center the map and marker on `position`, constructing the widget on first use
    pub fn show(&mut self, position: Coordinate) {
        let zoom = self.options.zoom;
        match &mut self.widget {
            Some(widget) => {
                widget.set_view(position, zoom);
                widget.set_marker(position);
            }
            None => {
                info!(container = %self.container_id, "Creating mini map");
                let mut widget = M::construct(&self.container_id, &self.options, position);
                widget.set_view(position, zoom);
                widget.set_marker(position);
                self.widget = Some(widget);
            }
        }
    }

    /// Forward a layout refresh to the widget, if one exists
    pub fn invalidate_layout(&mut self) {
        if let Some(widget) = &mut self.widget {
            debug!("Refreshing map layout");
            widget.invalidate_layout();
        }
    }

    pub fn tiles_ready(&self) -> Option<watch::Receiver<bool>> {
        self.widget.as_ref().and_then(|w| w.tiles_ready())
    }
}

/// XYZ tile containing `position` at `zoom`
pub fn tile_for(position: Coordinate, zoom: u8) -> (u32, u32) {
    let n = 2f64.powi(zoom as i32);
    let lat = position
        .latitude()
        .clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT)
        .to_radians();
    let x = ((position.longitude() + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * n).floor();
    let max = n - 1.0;
    (x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32)
}

/// Fill a `{s}/{x}/{y}/{z}` tile template
pub fn tile_url(template: &str, subdomains: &[String], x: u32, y: u32, zoom: u8) -> String {
    let subdomain = if subdomains.is_empty() {
        ""
    } else {
        subdomains[(x as usize + y as usize) % subdomains.len()].as_str()
    };
    template
        .replace("{s}", subdomain)
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
        .replace("{z}", &zoom.to_string())
}

/// Headless map widget
///
/// Tracks view, marker and layout passes without drawing anything. It never
/// fetches tiles, so there is nothing to wait for: the ready signal is raised
/// as soon as a view is set, and an export against this widget skips the
/// settle delay. Widgets that load tiles raise it once they are positioned.
#[derive(Debug)]
pub struct TileMap {
    options: MapOptions,
    center: Coordinate,
    zoom: u8,
    marker: Option<Coordinate>,
    layout_passes: u32,
    ready_tx: watch::Sender<bool>,
}

impl TileMap {
    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn marker(&self) -> Option<Coordinate> {
        self.marker
    }

    pub fn layout_passes(&self) -> u32 {
        self.layout_passes
    }

    /// URL of the tile under the current center
    pub fn center_tile_url(&self) -> String {
        let (x, y) = tile_for(self.center, self.zoom);
        tile_url(
            &self.options.tile_url_template,
            &self.options.subdomains,
            x,
            y,
            self.zoom,
        )
    }
}

impl MapWidget for TileMap {
    fn construct(container_id: &str, options: &MapOptions, center: Coordinate) -> Self {
        debug!(container = container_id, "Constructing tile map");
        let (ready_tx, _) = watch::channel(false);
        Self {
            options: options.clone(),
            center,
            zoom: options.zoom,
            marker: None,
            layout_passes: 0,
            ready_tx,
        }
    }

    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        self.center = center;
        self.zoom = zoom;
        self.ready_tx.send_replace(true);
    }

    fn set_marker(&mut self, position: Coordinate) {
        self.marker = Some(position);
    }

    fn invalidate_layout(&mut self) {
        self.layout_passes += 1;
    }

    fn tiles_ready(&self) -> Option<watch::Receiver<bool>> {
        Some(self.ready_tx.subscribe())
    }
}
