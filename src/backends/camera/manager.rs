// SPDX-License-Identifier: GPL-3.0-only

//! Camera stream lifecycle
//!
//! The manager is the only owner of the active stream. Every restart stops
//! the previous stream before a new device request is made, so two
//! acquisitions are never live at once.

use super::{CameraConstraints, FacingMode, MediaDevices, MediaStream};
use crate::errors::CameraError;
use image::RgbaImage;
use tracing::{info, warn};

/// Owns the camera collaborator and the single active stream
pub struct CameraManager<D: MediaDevices> {
    devices: D,
    stream: Option<D::Stream>,
    facing: FacingMode,
    ideal_width: u32,
    ideal_height: u32,
}

impl<D: MediaDevices> CameraManager<D> {
    /// Create a manager; no device is requested until [`start`](Self::start)
    pub fn new(devices: D, ideal_width: u32, ideal_height: u32) -> Self {
        Self {
            devices,
            stream: None,
            facing: FacingMode::default(),
            ideal_width,
            ideal_height,
        }
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn is_front_facing(&self) -> bool {
        self.facing.is_front()
    }

    pub fn stream(&self) -> Option<&D::Stream> {
        self.stream.as_ref()
    }

    pub fn devices(&self) -> &D {
        &self.devices
    }

    /// Whether a stream is currently held and delivering frames
    pub fn is_streaming(&self) -> bool {
        self.stream.as_ref().is_some_and(|s| s.is_active())
    }

    /// (Re)start the camera with the current facing mode
    ///
    /// Tries the high resolution constraints first and retries with the
    /// facing mode alone on any failure. The error of the second attempt is
    /// returned when both fail; the manager then holds no stream.
    pub async fn start(&mut self) -> Result<(), CameraError> {
        self.stop();

        let preferred =
            CameraConstraints::high_resolution(self.facing, self.ideal_width, self.ideal_height);
        let stream = match self.devices.request(&preferred).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!(
                    error = %e,
                    facing = %self.facing,
                    "High resolution camera request failed, retrying with defaults"
                );
                self.devices
                    .request(&CameraConstraints::bare(self.facing))
                    .await?
            }
        };

        info!(facing = %stream.facing(), "Camera stream started");
        self.stream = Some(stream);
        Ok(())
    }

    /// Flip between front and rear camera and restart
    pub async fn switch_camera(&mut self) -> Result<(), CameraError> {
        self.facing = self.facing.toggled();
        info!(facing = %self.facing, "Switching camera");
        self.start().await
    }

    /// Stop and drop the active stream, if any
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            info!("Camera stream stopped");
        }
    }

    /// Grab the current live frame
    pub fn grab_frame(&self) -> Result<RgbaImage, CameraError> {
        match &self.stream {
            Some(stream) if stream.is_active() => stream.grab_frame(),
            _ => Err(CameraError::NoFrameAvailable),
        }
    }
}

impl<D: MediaDevices> Drop for CameraManager<D> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        requests: Vec<CameraConstraints>,
        stops: usize,
    }

    struct FakeStream {
        facing: FacingMode,
        active: bool,
        log: Rc<RefCell<Log>>,
    }

    impl MediaStream for FakeStream {
        fn stop(&mut self) {
            if self.active {
                self.active = false;
                self.log.borrow_mut().stops += 1;
            }
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn facing(&self) -> FacingMode {
            self.facing
        }

        fn grab_frame(&self) -> Result<RgbaImage, CameraError> {
            Ok(RgbaImage::new(4, 3))
        }
    }

    struct FakeDevices {
        reject_high_res: bool,
        reject_all: bool,
        log: Rc<RefCell<Log>>,
    }

    impl MediaDevices for FakeDevices {
        type Stream = FakeStream;

        async fn request(&self, constraints: &CameraConstraints) -> Result<FakeStream, CameraError> {
            self.log.borrow_mut().requests.push(*constraints);
            if self.reject_all {
                return Err(CameraError::PermissionDenied);
            }
            if self.reject_high_res && !constraints.is_bare() {
                return Err(CameraError::Overconstrained("width".into()));
            }
            Ok(FakeStream {
                facing: constraints.facing,
                active: true,
                log: self.log.clone(),
            })
        }
    }

    fn manager(reject_high_res: bool, reject_all: bool) -> (CameraManager<FakeDevices>, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let devices = FakeDevices {
            reject_high_res,
            reject_all,
            log: log.clone(),
        };
        (CameraManager::new(devices, 3840, 2160), log)
    }

    #[tokio::test]
    async fn test_high_resolution_first() {
        let (mut cam, log) = manager(false, false);
        cam.start().await.unwrap();
        assert_eq!(log.borrow().requests.len(), 1);
        assert_eq!(log.borrow().requests[0].ideal_width, Some(3840));
        assert!(cam.is_streaming());
    }

    #[tokio::test]
    async fn test_falls_back_to_bare_constraints() {
        let (mut cam, log) = manager(true, false);
        cam.start().await.unwrap();
        let requests = &log.borrow().requests;
        assert_eq!(requests.len(), 2);
        assert!(requests[1].is_bare());
        assert_eq!(requests[1].facing, FacingMode::Environment);
        assert!(cam.grab_frame().is_ok());
    }

    #[tokio::test]
    async fn test_both_attempts_fail() {
        let (mut cam, log) = manager(false, true);
        assert_eq!(cam.start().await, Err(CameraError::PermissionDenied));
        assert_eq!(log.borrow().requests.len(), 2);
        assert!(!cam.is_streaming());
        assert_eq!(cam.grab_frame(), Err(CameraError::NoFrameAvailable));
    }

    #[tokio::test]
    async fn test_switch_stops_previous_stream_first() {
        let (mut cam, log) = manager(false, false);
        cam.start().await.unwrap();
        cam.switch_camera().await.unwrap();
        assert_eq!(log.borrow().stops, 1);
        assert_eq!(cam.facing(), FacingMode::User);
        assert_eq!(cam.stream().map(|s| s.facing()), Some(FacingMode::User));
    }
}
