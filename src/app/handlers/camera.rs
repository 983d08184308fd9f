// SPDX-License-Identifier: GPL-3.0-only

//! Camera control handlers
//!
//! Start, switch and retake. Every path that replaces the stream goes
//! through the camera manager, which stops the old stream first.

use crate::app::state::UiMode;
use crate::app::{AppModel, Platform};
use crate::constants::text;
use crate::errors::{AppError, AppResult};
use tracing::{error, info};

impl<P: Platform> AppModel<P> {
    /// Start the live feed with the current facing mode
    ///
    /// When neither the high resolution nor the fallback request succeeds the
    /// user gets a blocking notice and the error is returned.
    pub async fn start_camera(&mut self) -> AppResult<()> {
        match self.camera.start().await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(error = %e, "Camera unavailable");
                self.notifier.notify(text::CAMERA_DENIED);
                Err(AppError::Camera(e))
            }
        }
    }

    /// Flip front/rear camera
    ///
    /// The control only exists in live mode; triggers from preview are ignored.
    pub async fn switch_camera(&mut self) -> AppResult<()> {
        if self.mode.mode() != UiMode::Live {
            info!("Switch camera ignored outside live mode");
            return Ok(());
        }
        match self.camera.switch_camera().await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(error = %e, "Camera unavailable after switch");
                self.notifier.notify(text::CAMERA_DENIED);
                Err(AppError::Camera(e))
            }
        }
    }

    /// Discard the capture, restart the camera and return to live mode
    ///
    /// Live mode is entered even when the camera cannot be restarted, so the
    /// user can still upload a file.
    pub async fn retake(&mut self) -> AppResult<()> {
        let restarted = self.start_camera().await;

        let effects = self.mode.enter_live();
        self.apply_effects(effects);
        if let Some(session) = self.session.take() {
            info!(session = %session.id(), "Capture discarded");
        }

        restarted
    }
}
