// SPDX-License-Identifier: GPL-3.0-only

//! Capture location: position fix, mini map and address annotation
//!
//! ```text
//! Geolocation ──▶ Coordinate ──┬──▶ Map widget (re-center, move marker)
//!                              └──▶ Reverse geocoder ──▶ Annotation text
//! ```

pub mod annotator;
pub mod geocode;
pub mod geolocation;
pub mod map;

pub use annotator::{AnnotationOutcome, LocationAnnotator};
pub use geocode::{GeocodeResult, NominatimGeocoder, ReverseGeocoder};
pub use geolocation::{FixedGeolocation, GeolocationProvider, GeolocationRequest};
pub use map::{MapController, MapOptions, MapWidget, TileMap};

use crate::errors::LocationError;
use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside [-90, 90] / [-180, 180]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::InvalidCoordinate(format!(
                "{}, {}",
                latitude, longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Overlay text with seven decimals per axis
    pub fn display(&self) -> String {
        format!("Lat {:.7}° Long {:.7}°", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_seven_decimals() {
        let c = Coordinate::new(-6.2, 106.816666).unwrap();
        assert_eq!(c.display(), "Lat -6.2000000° Long 106.8166660°");
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Coordinate::new(90.5, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.1).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(-90.0, 180.0).is_ok());
    }
}
