// SPDX-License-Identifier: GPL-3.0-only

//! Capture operations handlers
//!
//! Live capture and upload both end in [`AppModel::begin_preview`]: crop,
//! enter preview, annotate, refresh the map layout.

use crate::app::state::{CaptureSession, CaptureSource, ModeEffect, UiMode};
use crate::app::{AppModel, Platform};
use crate::constants::text;
use crate::errors::{AppError, AppResult};
use crate::location::AnnotationOutcome;
use crate::pipelines::photo::{ViewRect, crop_to_viewport};
use chrono::Local;
use std::path::Path;
use tracing::{debug, info, warn};

impl<P: Platform> AppModel<P> {
    /// Capture the current live frame, cropped to `view`
    ///
    /// `view` is the viewfinder size sampled at the moment of capture.
    /// Front camera frames are mirrored to match the mirrored viewfinder.
    pub async fn capture(&mut self, view: ViewRect) -> AppResult<AnnotationOutcome> {
        self.ensure_live("capture")?;

        let frame = self.camera.grab_frame()?;
        let front_facing = self.camera.is_front_facing();
        info!(
            width = frame.width(),
            height = frame.height(),
            front_facing,
            "Capturing live frame"
        );

        let cropped = crop_to_viewport(&frame, view, front_facing);
        self.begin_preview(CaptureSource::LiveFrame, front_facing, cropped)
            .await
    }

    /// Use an image file picked by the user
    pub async fn upload_file(&mut self, path: &Path, view: ViewRect) -> AppResult<AnnotationOutcome> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = tokio::fs::read(path).await.inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "Cannot read upload");
            self.notifier.notify(&format!("{}{}", text::UPLOAD_FAILED, e));
        })?;
        self.upload(&name, &bytes, view).await
    }

    /// Use encoded image bytes picked by the user
    ///
    /// Uploads are never mirrored.
    pub async fn upload(
        &mut self,
        name: &str,
        bytes: &[u8],
        view: ViewRect,
    ) -> AppResult<AnnotationOutcome> {
        self.ensure_live("upload")?;
        self.file_selection = Some(name.to_string());

        let decoded = match image::load_from_memory(bytes) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                warn!(file = name, error = %e, "Upload could not be decoded");
                self.notifier.notify(&format!("{}{}", text::UPLOAD_FAILED, e));
                return Err(e.into());
            }
        };
        info!(
            file = name,
            width = decoded.width(),
            height = decoded.height(),
            "Processing upload"
        );

        let cropped = crop_to_viewport(&decoded, view, false);
        self.begin_preview(CaptureSource::Upload, false, cropped)
            .await
    }

    /// Start a session with `cropped`, enter preview, then annotate
    async fn begin_preview(
        &mut self,
        source: CaptureSource,
        front_facing: bool,
        cropped: image::RgbaImage,
    ) -> AppResult<AnnotationOutcome> {
        let session = CaptureSession::new(source, front_facing, cropped);
        info!(session = %session.id(), ?source, "Entering preview");
        self.session = Some(session);

        let effects = self.mode.enter_preview(&Local::now());
        self.apply_effects(effects);

        let outcome = match self.session.as_mut() {
            Some(session) => {
                self.annotator
                    .annotate(session, &mut self.map, self.notifier.as_ref())
                    .await
            }
            None => return Err(AppError::Other("No active capture".to_string())),
        };

        self.run_map_refresh().await;
        Ok(outcome)
    }

    /// Carry out the side effects of a mode transition
    pub(crate) fn apply_effects(&mut self, effects: Vec<ModeEffect>) {
        for effect in effects {
            match effect {
                ModeEffect::SetDisplayTime(time) => {
                    if let Some(session) = self.session.as_mut() {
                        session.annotation.time = time;
                    }
                }
                ModeEffect::RefreshMapAfter(delay) => {
                    self.map_refresh_at = Some(tokio::time::Instant::now() + delay);
                }
                ModeEffect::ClearFileSelection => {
                    self.file_selection = None;
                    self.map_refresh_at = None;
                }
            }
        }
    }

    /// Refresh the map layout once the scheduled delay has passed
    ///
    /// The refresh never runs before its deadline, so the map only measures
    /// its container after the preview made it visible.
    async fn run_map_refresh(&mut self) {
        if let Some(deadline) = self.map_refresh_at.take() {
            tokio::time::sleep_until(deadline).await;
            debug!("Map layout refresh due");
            self.map.invalidate_layout();
        }
    }

    fn ensure_live(&self, action: &str) -> AppResult<()> {
        if self.mode.mode() == UiMode::Live {
            Ok(())
        } else {
            Err(AppError::Other(format!(
                "Cannot {} while a capture is being previewed",
                action
            )))
        }
    }
}
