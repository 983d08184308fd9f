// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the geo camera

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Failure classes that decide how an error reaches the user
///
/// Device access and render failures become a blocking notice. Network
/// failures degrade into fallback text. A degenerate layout is handled by
/// substitution and never reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Camera or geolocation denied, missing or unsupported
    DeviceAccess,
    /// Geocoding or tiles unreachable
    Network,
    /// Snapshot composition failed
    Render,
    /// Zero-sized viewport
    LayoutDegenerate,
    /// Filesystem failure while saving or loading
    Storage,
    /// Invalid configuration
    Config,
}

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera-related errors
    Camera(CameraError),
    /// Geolocation errors
    Location(LocationError),
    /// Reverse geocoding errors
    Geocode(GeocodeError),
    /// Snapshot errors
    Render(RenderError),
    /// Upload decoding errors
    Decode(String),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Camera collaborator failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// The user or platform refused camera access
    PermissionDenied,
    /// No camera matches the requested facing mode
    NotFound,
    /// The device cannot satisfy the requested constraints
    Overconstrained(String),
    /// The stream has no frame to hand out
    NoFrameAvailable,
    /// Any other backend failure
    Backend(String),
}

/// Geolocation collaborator failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    /// The user or platform refused location access
    PermissionDenied,
    /// No fix within the requested timeout
    Timeout,
    /// The platform could not determine a position
    PositionUnavailable,
    /// The reported position lies outside valid latitude/longitude ranges
    InvalidCoordinate(String),
}

/// Reverse-geocoding collaborator failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    /// Request could not be sent or returned a non-success status
    Network(String),
    /// The service answered without a usable address
    EmptyResult,
    /// The response body could not be decoded
    Decode(String),
}

/// Snapshot collaborator failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError(pub String);

impl AppError {
    /// Map this error into the user-facing failure class
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Camera(_) => ErrorKind::DeviceAccess,
            AppError::Location(_) => ErrorKind::DeviceAccess,
            AppError::Geocode(_) => ErrorKind::Network,
            AppError::Render(_) | AppError::Decode(_) => ErrorKind::Render,
            AppError::Config(_) => ErrorKind::Config,
            AppError::Storage(_) | AppError::Other(_) => ErrorKind::Storage,
        }
    }

    /// Whether the error must be shown as a blocking notice
    pub fn is_user_blocking(&self) -> bool {
        matches!(self.kind(), ErrorKind::DeviceAccess | ErrorKind::Render)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Location(e) => write!(f, "Location error: {}", e),
            AppError::Geocode(e) => write!(f, "Geocoding error: {}", e),
            AppError::Render(e) => write!(f, "Render error: {}", e),
            AppError::Decode(msg) => write!(f, "Cannot decode image: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::PermissionDenied => write!(f, "Camera permission denied"),
            CameraError::NotFound => write!(f, "No matching camera found"),
            CameraError::Overconstrained(msg) => write!(f, "Constraints not satisfiable: {}", msg),
            CameraError::NoFrameAvailable => write!(f, "No frame available for capture"),
            CameraError::Backend(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::PermissionDenied => write!(f, "User denied Geolocation"),
            LocationError::Timeout => write!(f, "Timeout expired"),
            LocationError::PositionUnavailable => write!(f, "Position unavailable"),
            LocationError::InvalidCoordinate(msg) => write!(f, "Invalid coordinate: {}", msg),
        }
    }
}

impl fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeocodeError::Network(msg) => write!(f, "Network error: {}", msg),
            GeocodeError::EmptyResult => write!(f, "Address empty"),
            GeocodeError::Decode(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for LocationError {}
impl std::error::Error for GeocodeError {}
impl std::error::Error for RenderError {}

// Conversions from sub-errors to AppError
impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<LocationError> for AppError {
    fn from(err: LocationError) -> Self {
        AppError::Location(err)
    }
}

impl From<GeocodeError> for AppError {
    fn from(err: GeocodeError) -> Self {
        AppError::Geocode(err)
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Render(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GeocodeError::Network("timeout".to_string())
        } else if err.is_decode() {
            GeocodeError::Decode(err.to_string())
        } else {
            GeocodeError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_and_render_errors_block() {
        assert!(AppError::from(CameraError::PermissionDenied).is_user_blocking());
        assert!(AppError::from(LocationError::Timeout).is_user_blocking());
        assert!(AppError::from(RenderError("tainted".into())).is_user_blocking());
    }

    #[test]
    fn test_network_errors_degrade() {
        let err = AppError::from(GeocodeError::EmptyResult);
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(!err.is_user_blocking());
    }
}
