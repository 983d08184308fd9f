// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Prefix of every exported composite file name
pub const EXPORT_FILE_PREFIX: &str = "GeoCamera";

/// Extension of exported composites (always JPEG)
pub const EXPORT_FILE_EXTENSION: &str = "jpg";

/// Length of the `YYYYMMDD_HHMMSS` file token
pub const FILE_TOKEN_LEN: usize = 15;

/// Camera request defaults
pub mod camera {
    /// Ideal width requested on the first (high resolution) attempt
    pub const IDEAL_WIDTH: u32 = 3840;
    /// Ideal height requested on the first (high resolution) attempt
    pub const IDEAL_HEIGHT: u32 = 2160;
}

/// Timing constants
///
/// The settle delay is a bounded wait for asynchronous tile layout before a
/// snapshot. It is a known source of flakiness on slow networks; tune it in
/// the config file rather than here.
pub mod timing {
    use super::Duration;

    /// Delay between entering preview and asking the map to recompute its layout
    pub const MAP_REFRESH_DELAY: Duration = Duration::from_millis(500);
    /// Wait before snapshotting the composed view
    pub const EXPORT_SETTLE_DELAY: Duration = Duration::from_millis(1000);
    /// Upper bound for a geolocation fix
    pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_millis(10_000);
    /// Upper bound for one reverse geocoding lookup
    pub const GEOCODE_TIMEOUT: Duration = Duration::from_millis(10_000);
    /// Cached positions are never accepted
    pub const GEOLOCATION_MAX_AGE: Duration = Duration::ZERO;
}

/// Map widget defaults
pub mod map {
    /// Satellite tile source (`{s}` is replaced by one of [`TILE_SUBDOMAINS`])
    pub const TILE_URL_TEMPLATE: &str = "https://{s}.google.com/vt/lyrs=y&x={x}&y={y}&z={z}";
    /// Subdomains rotated into the tile URL template
    pub const TILE_SUBDOMAINS: [&str; 4] = ["mt0", "mt1", "mt2", "mt3"];
    /// Zoom level used for the mini map
    pub const ZOOM: u8 = 17;
    /// Container the mini map is mounted into
    pub const CONTAINER_ID: &str = "miniMap";
}

/// Reverse geocoding defaults
pub mod geocode {
    /// Nominatim instance used for reverse lookups
    pub const BASE_URL: &str = "https://nominatim.openstreetmap.org";
    /// Detail level requested from Nominatim (18 = building)
    pub const ZOOM: u8 = 18;
    /// User agent sent with every lookup (Nominatim usage policy requires one)
    pub const USER_AGENT: &str = concat!("geocam/", env!("CARGO_PKG_VERSION"));
    /// Address components consulted for the place title, highest priority first
    pub const TITLE_PRIORITY: [&str; 6] = [
        "amenity",
        "building",
        "village",
        "suburb",
        "city_district",
        "county",
    ];
    /// Address component appended to the title in the header line
    pub const REGION_KEY: &str = "state";
}

/// Composite export defaults
pub mod export {
    /// Pixel density multiplier for the snapshot
    pub const SCALE: f32 = 2.0;
    /// JPEG quality of the exported composite
    pub const JPEG_QUALITY: u8 = 95;
    /// Label of the download control
    pub const DOWNLOAD_LABEL: &str = "Download";
    /// Label shown on the download control while an export is in flight
    pub const BUSY_LABEL: &str = "⏳ Processing...";
}

/// User-facing text
pub mod text {
    /// Header used when no address component yields a title
    pub const TITLE_FALLBACK: &str = "Captured Location";
    /// Header shown when the address lookup failed
    pub const HEADER_COORDINATES_ONLY: &str = "Coordinates Detected";
    /// Address line shown when the address lookup failed
    pub const ADDRESS_UNAVAILABLE: &str = "Address details cannot be loaded right now.";
    /// Address line shown when no position could be obtained
    pub const LOCATION_UNAVAILABLE: &str = "Location access denied or GPS is turned off.";
    /// Blocking notice when neither camera request succeeded
    pub const CAMERA_DENIED: &str = "Camera access was denied or is not supported on this device.";
    /// Prefix of the blocking notice for geolocation failures
    pub const LOCATION_FAILED: &str = "Failed to read location: ";
    /// Prefix of the blocking notice for unreadable uploads
    pub const UPLOAD_FAILED: &str = "Cannot open the selected image: ";
    /// Prefix of the blocking notice for export failures
    pub const EXPORT_FAILED: &str = "Failed to process image. Try again.\nError: ";
}

/// Supported upload formats
pub mod file_formats {
    /// Image extensions accepted by the upload path
    pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff"];

    /// Check if an extension (without dot, any case) is a supported image
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext))
    }
}
