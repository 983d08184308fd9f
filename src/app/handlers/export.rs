// SPDX-License-Identifier: GPL-3.0-only

//! Download handler

use crate::app::state::UiMode;
use crate::app::{AppModel, Platform};
use crate::export::{ComposedView, ExportOutcome};
use tracing::info;

impl<P: Platform> AppModel<P> {
    /// Export the composed preview as one image
    ///
    /// Returns `None` when there is no previewed capture. A trigger while an
    /// export is in flight yields [`ExportOutcome::Busy`].
    pub async fn download(&self) -> Option<ExportOutcome> {
        if self.mode.mode() != UiMode::Preview {
            info!("Download ignored outside preview mode");
            return None;
        }
        let session = self.session.as_ref()?;
        let view = ComposedView::from_session(session);

        Some(
            self.exporter
                .export(&view, self.map.tiles_ready(), self.notifier.as_ref())
                .await,
        )
    }
}
