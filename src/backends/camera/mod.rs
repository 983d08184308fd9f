// SPDX-License-Identifier: GPL-3.0-only

//! Camera collaborator abstraction
//!
//! Acquiring a stream from a device is the host platform's job. The crate only
//! describes what it asks for ([`CameraConstraints`]), what it gets back
//! ([`MediaStream`]) and how the single active stream is owned
//! ([`CameraManager`]).

pub mod file_source;
pub mod manager;
pub mod types;

pub use file_source::FileCamera;
pub use manager::CameraManager;
pub use types::*;

use crate::errors::CameraError;
use image::RgbaImage;

/// A live stream handed out by [`MediaDevices::request`]
pub trait MediaStream {
    /// Release every track of the stream
    ///
    /// Stopping twice is harmless.
    fn stop(&mut self);

    /// Whether the stream still delivers frames
    fn is_active(&self) -> bool;

    /// Facing mode the stream was opened with
    fn facing(&self) -> FacingMode;

    /// Copy out the current frame at the stream's native resolution
    fn grab_frame(&self) -> Result<RgbaImage, CameraError>;
}

/// Camera collaborator: turns constraints into a stream
#[allow(async_fn_in_trait)]
pub trait MediaDevices {
    type Stream: MediaStream;

    /// Request a stream matching `constraints`
    ///
    /// Suspends until the platform grants or refuses the device.
    async fn request(&self, constraints: &CameraConstraints) -> Result<Self::Stream, CameraError>;
}
