// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON at `$XDG_CONFIG_HOME/geocam/config.json`. Every field has a
//! default, so a partial file only overrides what it names.

use crate::constants::{camera, export, geocode, map, timing};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Name of the config directory and file
const CONFIG_DIR: &str = "geocam";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Satellite tile URL template with `{s}`, `{x}`, `{y}`, `{z}` placeholders
    pub tile_url_template: String,
    /// Subdomains substituted for `{s}`
    pub tile_subdomains: Vec<String>,
    /// Mini map zoom level
    pub map_zoom: u8,
    /// Container id the mini map is mounted into
    pub map_container_id: String,
    /// Reverse geocoder base URL
    pub geocoder_url: String,
    /// User agent for reverse geocoding requests
    pub user_agent: String,
    /// Geolocation timeout in milliseconds
    pub geolocation_timeout_ms: u64,
    /// Reverse geocoding timeout in milliseconds
    pub geocode_timeout_ms: u64,
    /// Delay before the map recomputes its layout after entering preview
    pub map_refresh_delay_ms: u64,
    /// Wait before snapshotting the composed view
    pub export_settle_delay_ms: u64,
    /// Snapshot pixel density
    pub export_scale: f32,
    /// JPEG quality of exported composites (1-100)
    pub export_jpeg_quality: u8,
    /// Ideal camera width for the first request
    pub ideal_width: u32,
    /// Ideal camera height for the first request
    pub ideal_height: u32,
    /// Directory downloads are written to (None = pictures dir)
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tile_url_template: map::TILE_URL_TEMPLATE.to_string(),
            tile_subdomains: map::TILE_SUBDOMAINS.iter().map(|s| s.to_string()).collect(),
            map_zoom: map::ZOOM,
            map_container_id: map::CONTAINER_ID.to_string(),
            geocoder_url: geocode::BASE_URL.to_string(),
            user_agent: geocode::USER_AGENT.to_string(),
            geolocation_timeout_ms: timing::GEOLOCATION_TIMEOUT.as_millis() as u64,
            geocode_timeout_ms: timing::GEOCODE_TIMEOUT.as_millis() as u64,
            map_refresh_delay_ms: timing::MAP_REFRESH_DELAY.as_millis() as u64,
            export_settle_delay_ms: timing::EXPORT_SETTLE_DELAY.as_millis() as u64,
            export_scale: export::SCALE,
            export_jpeg_quality: export::JPEG_QUALITY,
            ideal_width: camera::IDEAL_WIDTH,
            ideal_height: camera::IDEAL_HEIGHT,
            export_dir: None,
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load the config from the default location
    ///
    /// A missing file yields the defaults. A malformed file is reported and
    /// replaced by the defaults so the camera stays usable.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            debug!("No config directory, using defaults");
            return Self::default();
        };

        if !path.exists() {
            debug!(path = %path.display(), "Config file absent, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
                Self::default()
            }
        }
    }

    /// Load and validate a config file
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config =
            serde_json::from_str(&raw).map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values that would break the pipeline
    pub fn validate(&self) -> AppResult<()> {
        if !(1..=100).contains(&self.export_jpeg_quality) {
            return Err(AppError::Config(format!(
                "export_jpeg_quality must be 1-100, got {}",
                self.export_jpeg_quality
            )));
        }
        if !(self.export_scale.is_finite() && self.export_scale > 0.0) {
            return Err(AppError::Config(format!(
                "export_scale must be positive, got {}",
                self.export_scale
            )));
        }
        if self.tile_url_template.contains("{s}") && self.tile_subdomains.is_empty() {
            return Err(AppError::Config(
                "tile_url_template uses {s} but tile_subdomains is empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }

    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_millis(self.geocode_timeout_ms)
    }

    pub fn map_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.map_refresh_delay_ms)
    }

    pub fn export_settle_delay(&self) -> Duration {
        Duration::from_millis(self.export_settle_delay_ms)
    }

    /// Directory exported composites are written to
    pub fn export_directory(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| {
            dirs::picture_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(crate::constants::EXPORT_FILE_PREFIX)
        })
    }
}
