// SPDX-License-Identifier: GPL-3.0-only

//! Composite export
//!
//! Flattens the whole preview (photo, overlay, map) into one JPEG and hands
//! it to the download mechanism:
//!
//! ```text
//! mark busy ─▶ settle ─▶ snapshot ─▶ JPEG 95 ─▶ GeoCamera_<token>.jpg
//!     ▲                                                │
//!     └──────────── restore label, re-enable ◀─────────┘  (always)
//! ```
//!
//! The download control doubles as the guard: while it is disabled every
//! further trigger is ignored, so exports never interleave.

pub mod download;
pub mod snapshot;

pub use download::{DirectoryDownloads, DownloadSink, export_filename};
pub use snapshot::{ComposedView, RasterSnapshot, SnapshotOptions, SnapshotRenderer};

use crate::constants::{export, text};
use crate::errors::{AppError, AppResult};
use crate::notify::Notifier;
use crate::pipelines::photo::PhotoEncoder;
use crate::time_format;
use std::cell::RefCell;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// State of the control that triggers exports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadControl {
    pub label: String,
    pub disabled: bool,
}

impl Default for DownloadControl {
    fn default() -> Self {
        Self {
            label: export::DOWNLOAD_LABEL.to_string(),
            disabled: false,
        }
    }
}

/// Result of one export trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The composite was delivered here
    Delivered(PathBuf),
    /// Another export was in flight; nothing was done
    Busy,
    /// The export failed; the user has been notified
    Failed(String),
}

/// Export tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportSettings {
    /// Bounded wait for tile layout before snapshotting
    pub settle_delay: Duration,
    pub scale: f32,
    pub jpeg_quality: u8,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            settle_delay: crate::constants::timing::EXPORT_SETTLE_DELAY,
            scale: export::SCALE,
            jpeg_quality: export::JPEG_QUALITY,
        }
    }
}

impl ExportSettings {
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self {
            settle_delay: config.export_settle_delay(),
            scale: config.export_scale,
            jpeg_quality: config.export_jpeg_quality,
        }
    }
}

/// Puts the control back the way it was when dropped
///
/// Dropping also covers an export future that is cancelled mid-flight.
struct RestoreControl<'a> {
    control: &'a RefCell<DownloadControl>,
    label: Option<String>,
}

impl Drop for RestoreControl<'_> {
    fn drop(&mut self) {
        let mut control = self.control.borrow_mut();
        if let Some(label) = self.label.take() {
            control.label = label;
        }
        control.disabled = false;
    }
}

/// Runs composite exports one at a time
pub struct ExportComposer<S, D> {
    snapshot: S,
    downloads: D,
    encoder: PhotoEncoder,
    settings: ExportSettings,
    control: RefCell<DownloadControl>,
}

impl<S: SnapshotRenderer, D: DownloadSink> ExportComposer<S, D> {
    pub fn new(snapshot: S, downloads: D, settings: ExportSettings) -> Self {
        Self {
            snapshot,
            downloads,
            encoder: PhotoEncoder::new(settings.jpeg_quality),
            settings,
            control: RefCell::new(DownloadControl::default()),
        }
    }

    /// Current state of the download control
    pub fn control(&self) -> DownloadControl {
        self.control.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.control.borrow().disabled
    }

    pub fn downloads(&self) -> &D {
        &self.downloads
    }

    /// Export `view` as one JPEG
    ///
    /// `tiles_ready`, when given, ends the settle wait early once the map
    /// reports its tiles positioned; the settle delay still bounds the wait.
    pub async fn export(
        &self,
        view: &ComposedView,
        tiles_ready: Option<watch::Receiver<bool>>,
        notifier: &dyn Notifier,
    ) -> ExportOutcome {
        let original_label = {
            let mut control = self.control.borrow_mut();
            if control.disabled {
                debug!("Export already in flight, ignoring trigger");
                return ExportOutcome::Busy;
            }
            control.disabled = true;
            std::mem::replace(&mut control.label, export::BUSY_LABEL.to_string())
        };
        let _restore = RestoreControl {
            control: &self.control,
            label: Some(original_label),
        };

        self.settle(tiles_ready).await;

        match self.compose_and_deliver(view).await {
            Ok(path) => {
                info!(path = %path.display(), "Composite exported");
                ExportOutcome::Delivered(path)
            }
            Err(e) => {
                let message = match &e {
                    AppError::Render(inner) => inner.to_string(),
                    other => other.to_string(),
                };
                warn!(error = %message, "Composite export failed");
                notifier.notify(&format!("{}{}", text::EXPORT_FAILED, message));
                ExportOutcome::Failed(message)
            }
        }
    }

    async fn settle(&self, tiles_ready: Option<watch::Receiver<bool>>) {
        let delay = self.settings.settle_delay;
        match tiles_ready {
            Some(mut ready) => {
                let waited = tokio::time::timeout(delay, ready.wait_for(|r| *r)).await;
                if !matches!(waited, Ok(Ok(_))) {
                    debug!(delay_ms = delay.as_millis() as u64, "Tiles not confirmed ready, snapshotting anyway");
                }
            }
            None => tokio::time::sleep(delay).await,
        }
    }

    async fn compose_and_deliver(&self, view: &ComposedView) -> AppResult<PathBuf> {
        let options = SnapshotOptions::for_view(view, self.settings.scale);
        let bitmap = self.snapshot.capture(view, &options).await?;
        let encoded = self.encoder.encode(bitmap).await?;
        let filename = export_filename(&time_format::file_token_now());
        let path = self.downloads.deliver(&filename, encoded.data).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::Annotation;
    use crate::errors::RenderError;
    use crate::notify::CollectingNotifier;
    use image::RgbaImage;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryDownloads(Mutex<Vec<(String, usize)>>);

    impl DownloadSink for MemoryDownloads {
        async fn deliver(&self, filename: &str, data: Vec<u8>) -> std::io::Result<PathBuf> {
            self.0.lock().unwrap().push((filename.to_string(), data.len()));
            Ok(PathBuf::from(filename))
        }
    }

    struct BrokenSnapshot;

    impl SnapshotRenderer for BrokenSnapshot {
        async fn capture(
            &self,
            _view: &ComposedView,
            _options: &SnapshotOptions,
        ) -> Result<RgbaImage, RenderError> {
            Err(RenderError("tainted canvas".to_string()))
        }
    }

    fn view() -> ComposedView {
        ComposedView {
            photo: RgbaImage::new(8, 8),
            annotation: Annotation::default(),
            document_width: 8,
            document_height: 8,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_trigger_is_ignored() {
        let composer =
            ExportComposer::new(RasterSnapshot, MemoryDownloads::default(), ExportSettings::default());
        let notifier = CollectingNotifier::default();
        let v = view();

        let (first, second) = futures::join!(
            composer.export(&v, None, &notifier),
            composer.export(&v, None, &notifier)
        );

        assert!(matches!(first, ExportOutcome::Delivered(_)));
        assert_eq!(second, ExportOutcome::Busy);
        let delivered = composer.downloads().0.lock().unwrap().clone();
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].0.starts_with("GeoCamera_"));
        assert!(delivered[0].0.ends_with(".jpg"));
        assert_eq!(composer.control(), DownloadControl::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_control_busy_while_settling() {
        let composer =
            ExportComposer::new(RasterSnapshot, MemoryDownloads::default(), ExportSettings::default());
        let notifier = CollectingNotifier::default();
        let v = view();

        let running = composer.export(&v, None, &notifier);
        let observer = async {
            tokio::task::yield_now().await;
            composer.control()
        };
        let (_, during) = futures::join!(running, observer);

        assert!(during.disabled);
        assert_eq!(during.label, export::BUSY_LABEL);
        assert!(!composer.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_notifies_and_restores() {
        let composer =
            ExportComposer::new(BrokenSnapshot, MemoryDownloads::default(), ExportSettings::default());
        let notifier = CollectingNotifier::default();

        let outcome = composer.export(&view(), None, &notifier).await;

        assert_eq!(outcome, ExportOutcome::Failed("tainted canvas".to_string()));
        assert_eq!(
            notifier.messages(),
            vec![format!("{}tainted canvas", text::EXPORT_FAILED)]
        );
        assert_eq!(composer.control(), DownloadControl::default());
        assert!(composer.downloads().0.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_signal_shortens_wait() {
        let settings = ExportSettings {
            settle_delay: Duration::from_secs(3600),
            ..ExportSettings::default()
        };
        let composer = ExportComposer::new(RasterSnapshot, MemoryDownloads::default(), settings);
        let notifier = CollectingNotifier::default();
        let (_tx, rx) = watch::channel(true);

        let start = tokio::time::Instant::now();
        let outcome = composer.export(&view(), Some(rx), &notifier).await;

        assert!(matches!(outcome, ExportOutcome::Delivered(_)));
        assert!(start.elapsed() < Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn test_back_to_back_exports_keep_both_files() {
        let dir = std::env::temp_dir().join(format!("geocam-export-{}", uuid::Uuid::new_v4()));
        let settings = ExportSettings {
            settle_delay: Duration::ZERO,
            ..ExportSettings::default()
        };
        let composer = ExportComposer::new(RasterSnapshot, DirectoryDownloads::new(&dir), settings);
        let notifier = CollectingNotifier::default();

        let mut second_view = view();
        second_view.photo = RgbaImage::from_pixel(8, 8, image::Rgba([255, 255, 255, 255]));
        let first = composer.export(&view(), None, &notifier).await;
        let second = composer.export(&second_view, None, &notifier).await;

        let (ExportOutcome::Delivered(a), ExportOutcome::Delivered(b)) = (first, second) else {
            panic!("both exports should be delivered");
        };
        assert_ne!(a, b);
        assert!(a.exists() && b.exists());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 2);
        std::fs::remove_dir_all(&dir).ok();
    }
}
