// SPDX-License-Identifier: GPL-3.0-only

//! Still image file as a camera
//!
//! Serves one decoded image as the live frame of every stream it opens.
//! Used by the command line front end and as a virtual camera in tests.

use super::{CameraConstraints, FacingMode, MediaDevices, MediaStream};
use crate::constants::file_formats;
use crate::errors::CameraError;
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Camera collaborator backed by an image file
#[derive(Debug, Clone)]
pub struct FileCamera {
    path: PathBuf,
}

impl FileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Stream opened by [`FileCamera`]
#[derive(Debug, Clone)]
pub struct FileStream {
    frame: Arc<RgbaImage>,
    facing: FacingMode,
    active: bool,
}

impl MediaStream for FileStream {
    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn facing(&self) -> FacingMode {
        self.facing
    }

    fn grab_frame(&self) -> Result<RgbaImage, CameraError> {
        if !self.active {
            return Err(CameraError::NoFrameAvailable);
        }
        Ok(self.frame.as_ref().clone())
    }
}

impl MediaDevices for FileCamera {
    type Stream = FileStream;

    /// Decode the file and open a stream on it
    ///
    /// Ideal sizes behave as hard limits here: a file smaller than the
    /// requested resolution fails with `Overconstrained`, which exercises
    /// the caller's fallback path.
    async fn request(&self, constraints: &CameraConstraints) -> Result<FileStream, CameraError> {
        let extension = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        if !file_formats::is_image_extension(extension) {
            return Err(CameraError::Backend(format!(
                "Unsupported file format: {}",
                extension
            )));
        }

        let path = self.path.clone();
        let frame = tokio::task::spawn_blocking(move || load_image_as_frame(&path))
            .await
            .map_err(|e| CameraError::Backend(format!("Loader task error: {}", e)))??;

        if let (Some(w), Some(h)) = (constraints.ideal_width, constraints.ideal_height) {
            if frame.width() < w || frame.height() < h {
                debug!(
                    requested_width = w,
                    requested_height = h,
                    width = frame.width(),
                    height = frame.height(),
                    "File smaller than requested resolution"
                );
                return Err(CameraError::Overconstrained(format!(
                    "{}x{} not available, file is {}x{}",
                    w,
                    h,
                    frame.width(),
                    frame.height()
                )));
            }
        }

        info!(
            path = %self.path.display(),
            facing = %constraints.facing,
            "Opened file camera"
        );

        Ok(FileStream {
            frame: Arc::new(frame),
            facing: constraints.facing,
            active: true,
        })
    }
}

fn load_image_as_frame(path: &Path) -> Result<RgbaImage, CameraError> {
    if !path.exists() {
        return Err(CameraError::NotFound);
    }
    let img = image::open(path).map_err(|e| CameraError::Backend(e.to_string()))?;
    Ok(img.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, w: u32, h: u32) -> PathBuf {
        let path = dir.join(format!("frame_{}x{}.png", w, h));
        RgbaImage::new(w, h).save(&path).unwrap();
        path
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("geocam-{}-{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let cam = FileCamera::new("/nonexistent/geocam/frame.png");
        let err = cam
            .request(&CameraConstraints::bare(FacingMode::User))
            .await
            .unwrap_err();
        assert_eq!(err, CameraError::NotFound);
    }

    #[tokio::test]
    async fn test_small_file_is_overconstrained_at_4k() {
        let dir = scratch_dir("small");
        let cam = FileCamera::new(write_png(&dir, 64, 48));

        let high = CameraConstraints::high_resolution(FacingMode::Environment, 3840, 2160);
        assert!(matches!(
            cam.request(&high).await,
            Err(CameraError::Overconstrained(_))
        ));

        let stream = cam
            .request(&CameraConstraints::bare(FacingMode::Environment))
            .await
            .unwrap();
        assert_eq!(stream.grab_frame().unwrap().dimensions(), (64, 48));
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn test_stopped_stream_has_no_frame() {
        let dir = scratch_dir("stop");
        let cam = FileCamera::new(write_png(&dir, 8, 8));
        let mut stream = cam
            .request(&CameraConstraints::bare(FacingMode::User))
            .await
            .unwrap();
        assert_eq!(stream.facing(), FacingMode::User);
        stream.stop();
        assert_eq!(stream.grab_frame(), Err(CameraError::NoFrameAvailable));
        std::fs::remove_dir_all(dir).ok();
    }
}
