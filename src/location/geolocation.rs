// SPDX-License-Identifier: GPL-3.0-only

//! Geolocation collaborator

use super::Coordinate;
use crate::constants::timing;
use crate::errors::LocationError;
use std::time::Duration;
use tracing::debug;

/// Options for a single position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationRequest {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix that may be returned
    pub maximum_age: Duration,
}

impl GeolocationRequest {
    /// High accuracy, bounded wait, no cached fix
    pub fn fresh(timeout: Duration) -> Self {
        Self {
            high_accuracy: true,
            timeout,
            maximum_age: timing::GEOLOCATION_MAX_AGE,
        }
    }
}

impl Default for GeolocationRequest {
    fn default() -> Self {
        Self::fresh(timing::GEOLOCATION_TIMEOUT)
    }
}

/// Source of the device position
#[allow(async_fn_in_trait)]
pub trait GeolocationProvider {
    /// Obtain one position fix, honouring the request's timeout
    async fn current_position(
        &self,
        request: &GeolocationRequest,
    ) -> Result<Coordinate, LocationError>;
}

/// Provider that answers with a preset position or a preset failure
///
/// Stands in for device GPS on hosts without one, e.g. the command line.
#[derive(Debug, Clone)]
pub struct FixedGeolocation {
    result: Result<Coordinate, LocationError>,
}

impl FixedGeolocation {
    pub fn at(coordinate: Coordinate) -> Self {
        Self {
            result: Ok(coordinate),
        }
    }

    pub fn failing(error: LocationError) -> Self {
        Self { result: Err(error) }
    }
}

impl GeolocationProvider for FixedGeolocation {
    async fn current_position(
        &self,
        request: &GeolocationRequest,
    ) -> Result<Coordinate, LocationError> {
        debug!(
            high_accuracy = request.high_accuracy,
            timeout_ms = request.timeout.as_millis() as u64,
            "Fixed geolocation request"
        );
        self.result.clone()
    }
}

/// Bound any provider future by the request timeout
///
/// Providers that cannot enforce the timeout themselves are wrapped with
/// this, so a silent GPS still ends the attempt with `Timeout`.
pub async fn with_timeout<P: GeolocationProvider>(
    provider: &P,
    request: &GeolocationRequest,
) -> Result<Coordinate, LocationError> {
    match tokio::time::timeout(request.timeout, provider.current_position(request)).await {
        Ok(result) => result,
        Err(_) => Err(LocationError::Timeout),
    }
}
