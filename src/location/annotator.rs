// SPDX-License-Identifier: GPL-3.0-only

//! Best-effort location annotation of a capture
//!
//! Runs after the preview is shown. Every failure ends the attempt with
//! fallback text in the overlay; nothing propagates to the caller.

use super::geocode::ReverseGeocoder;
use super::geolocation::{GeolocationProvider, GeolocationRequest, with_timeout};
use super::map::{MapController, MapWidget};
use crate::app::state::CaptureSession;
use crate::constants::{text, timing};
use crate::errors::{GeocodeError, LocationError};
use crate::notify::Notifier;
use std::time::Duration;
use tracing::{info, warn};

/// How far an annotation attempt got
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationOutcome {
    /// Coordinates and address are shown
    Resolved,
    /// Coordinates are shown, the address lookup failed
    CoordinatesOnly(GeocodeError),
    /// No position could be obtained
    NoLocation(LocationError),
}

/// Fills a capture's overlay with position, map and address
#[derive(Debug, Clone)]
pub struct LocationAnnotator<G, R> {
    geolocation: G,
    geocoder: R,
    request: GeolocationRequest,
    geocode_timeout: Duration,
}

impl<G: GeolocationProvider, R: ReverseGeocoder> LocationAnnotator<G, R> {
    pub fn new(geolocation: G, geocoder: R, request: GeolocationRequest) -> Self {
        Self {
            geolocation,
            geocoder,
            request,
            geocode_timeout: timing::GEOCODE_TIMEOUT,
        }
    }

    /// Bound every address lookup by `timeout`
    pub fn with_geocode_timeout(mut self, timeout: Duration) -> Self {
        self.geocode_timeout = timeout;
        self
    }

    pub fn geolocation(&self) -> &G {
        &self.geolocation
    }

    pub fn geocoder(&self) -> &R {
        &self.geocoder
    }

    /// Obtain a fix, move the map there and resolve the address
    pub async fn annotate<M: MapWidget>(
        &self,
        session: &mut CaptureSession,
        map: &mut MapController<M>,
        notifier: &dyn Notifier,
    ) -> AnnotationOutcome {
        let coordinate = match with_timeout(&self.geolocation, &self.request).await {
            Ok(coordinate) => coordinate,
            Err(e) => {
                warn!(session = %session.id(), error = %e, "Geolocation failed");
                notifier.notify(&format!("{}{}", text::LOCATION_FAILED, e));
                session.annotation.address = text::LOCATION_UNAVAILABLE.to_string();
                session.annotation.header = text::TITLE_FALLBACK.to_string();
                return AnnotationOutcome::NoLocation(e);
            }
        };

        if !session.set_location(coordinate) {
            warn!(session = %session.id(), "Session already has a location, keeping it");
        }
        let coordinate = session.location().unwrap_or(coordinate);
        session.annotation.coordinates = coordinate.display();
        map.show(coordinate);

        let resolved =
            match tokio::time::timeout(self.geocode_timeout, self.geocoder.resolve(coordinate)).await
            {
                Ok(result) => result,
                Err(_) => Err(GeocodeError::Network("timeout".to_string())),
            };

        match resolved {
            Ok(address) => {
                info!(session = %session.id(), "Location annotated");
                session.annotation.header = address.header_line();
                session.annotation.address = address.display_name;
                AnnotationOutcome::Resolved
            }
            Err(e) => {
                warn!(session = %session.id(), error = %e, "Reverse geocoding failed");
                session.annotation.address = text::ADDRESS_UNAVAILABLE.to_string();
                session.annotation.header = text::HEADER_COORDINATES_ONLY.to_string();
                AnnotationOutcome::CoordinatesOnly(e)
            }
        }
    }
}
