// SPDX-License-Identifier: GPL-3.0-only

//! Reverse geocoding
//!
//! Turns a coordinate into a display address plus named address components.
//! The shipped implementation queries a Nominatim instance.

use super::Coordinate;
use crate::constants::{geocode, text};
use crate::errors::GeocodeError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info};

/// Resolved address
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeocodeResult {
    /// Full single-line address
    pub display_name: String,
    /// Address components keyed by category (`amenity`, `state`, ...)
    pub components: BTreeMap<String, String>,
}

impl GeocodeResult {
    fn component(&self, key: &str) -> Option<&str> {
        self.components
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Human-friendly place name
    ///
    /// First present of amenity, building, village, suburb, city district,
    /// county; a generic placeholder otherwise.
    pub fn place_title(&self) -> &str {
        geocode::TITLE_PRIORITY
            .iter()
            .find_map(|key| self.component(key))
            .unwrap_or(text::TITLE_FALLBACK)
    }

    /// Header line: place title followed by the region when known
    pub fn header_line(&self) -> String {
        match self.component(geocode::REGION_KEY) {
            Some(region) => format!("{}, {}", self.place_title(), region),
            None => self.place_title().to_string(),
        }
    }
}

/// Address-resolution collaborator
#[allow(async_fn_in_trait)]
pub trait ReverseGeocoder {
    async fn resolve(&self, coordinate: Coordinate) -> Result<GeocodeResult, GeocodeError>;
}

/// Raw Nominatim `reverse` response
#[derive(Debug, Deserialize)]
struct NominatimResponse {
    display_name: Option<String>,
    #[serde(default)]
    address: BTreeMap<String, serde_json::Value>,
}

impl NominatimResponse {
    fn into_result(self) -> Result<GeocodeResult, GeocodeError> {
        let display_name = self
            .display_name
            .filter(|name| !name.trim().is_empty())
            .ok_or(GeocodeError::EmptyResult)?;

        // Nominatim components are strings; anything else is skipped
        let components = self
            .address
            .into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::String(s) => Some((key, s)),
                _ => None,
            })
            .collect();

        Ok(GeocodeResult {
            display_name,
            components,
        })
    }
}

/// Parse a Nominatim `reverse?format=json` body
pub fn parse_nominatim(body: &str) -> Result<GeocodeResult, GeocodeError> {
    let response: NominatimResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Decode(e.to_string()))?;
    response.into_result()
}

/// Reverse geocoder backed by a Nominatim HTTP endpoint
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// Build a client for `base_url`; every request gives up after `timeout`
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the reverse lookup for `coordinate`
    pub fn reverse_url(&self, coordinate: Coordinate) -> String {
        format!(
            "{}/reverse?format=json&lat={}&lon={}&zoom={}&addressdetails=1",
            self.base_url,
            coordinate.latitude(),
            coordinate.longitude(),
            geocode::ZOOM
        )
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    async fn resolve(&self, coordinate: Coordinate) -> Result<GeocodeResult, GeocodeError> {
        let url = self.reverse_url(coordinate);
        debug!(url = %url, "Reverse geocoding");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(GeocodeError::Network(format!(
                "HTTP status: {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let result = parse_nominatim(&body)?;
        info!(title = result.place_title(), "Address resolved");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(components: &[(&str, &str)]) -> GeocodeResult {
        GeocodeResult {
            display_name: "Somewhere".to_string(),
            components: components
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_title_priority_order() {
        let r = result(&[
            ("county", "Sleman"),
            ("suburb", "Caturtunggal"),
            ("building", "Gedung A"),
        ]);
        assert_eq!(r.place_title(), "Gedung A");

        let r = result(&[("county", "Sleman"), ("city_district", "Depok")]);
        assert_eq!(r.place_title(), "Depok");

        let r = result(&[("amenity", "Cafe"), ("building", "Gedung A")]);
        assert_eq!(r.place_title(), "Cafe");
    }

    #[test]
    fn test_unlisted_categories_are_ignored() {
        let r = result(&[("city", "Yogyakarta"), ("road", "Jalan Malioboro")]);
        assert_eq!(r.place_title(), text::TITLE_FALLBACK);
    }

    #[test]
    fn test_header_line_with_and_without_region() {
        let r = result(&[("village", "Sukamaju"), ("state", "Jawa Barat")]);
        assert_eq!(r.header_line(), "Sukamaju, Jawa Barat");

        let r = result(&[("village", "Sukamaju")]);
        assert_eq!(r.header_line(), "Sukamaju");
    }

    #[test]
    fn test_parse_full_response() {
        let body = r#"{
            "place_id": 1,
            "display_name": "Tugu, Jalan Jenderal Sudirman, Yogyakarta",
            "address": {"amenity": "Tugu", "state": "DIY", "country_code": "id"},
            "boundingbox": ["1", "2", "3", "4"]
        }"#;
        let r = parse_nominatim(body).unwrap();
        assert_eq!(r.display_name, "Tugu, Jalan Jenderal Sudirman, Yogyakarta");
        assert_eq!(r.header_line(), "Tugu, DIY");
    }

    #[test]
    fn test_error_body_is_empty_result() {
        assert_eq!(
            parse_nominatim(r#"{"error":"Unable to geocode"}"#),
            Err(GeocodeError::EmptyResult)
        );
    }

    #[test]
    fn test_garbage_body_is_decode_error() {
        assert!(matches!(
            parse_nominatim("<html>"),
            Err(GeocodeError::Decode(_))
        ));
    }

    #[test]
    fn test_reverse_url() {
        let geocoder = NominatimGeocoder::new("https://example.org/", "geocam-test", Duration::from_secs(5))
                .unwrap();
        let c = Coordinate::new(-7.5, 110.25).unwrap();
        assert_eq!(
            geocoder.reverse_url(c),
            "https://example.org/reverse?format=json&lat=-7.5&lon=110.25&zoom=18&addressdetails=1"
        );
    }
}
