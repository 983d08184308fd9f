// SPDX-License-Identifier: GPL-3.0-only

//! Application state: capture mode machine and the per-capture session
//!
//! The mode machine is pure. It returns the side effects a transition asks
//! for and leaves executing them to the caller, and it maps each mode to the
//! set of visible elements so a rendering adapter can apply it.

use crate::location::Coordinate;
use crate::time_format;
use chrono::{DateTime, TimeZone};
use image::RgbaImage;
use std::time::Duration;
use uuid::Uuid;

/// Which side of the capture flow the UI is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    /// Viewfinder with capture controls
    #[default]
    Live,
    /// Cropped capture with overlay and export controls
    Preview,
}

/// Every element whose visibility depends on the mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    LiveFeed,
    CaptureButton,
    UploadButton,
    SwitchCameraButton,
    PhotoOutput,
    InfoOverlay,
    RetakeButton,
    DownloadButton,
}

impl Element {
    pub const ALL: [Element; 8] = [
        Element::LiveFeed,
        Element::CaptureButton,
        Element::UploadButton,
        Element::SwitchCameraButton,
        Element::PhotoOutput,
        Element::InfoOverlay,
        Element::RetakeButton,
        Element::DownloadButton,
    ];

    /// Mode in which this element is shown
    pub fn shown_in(self) -> UiMode {
        match self {
            Element::LiveFeed
            | Element::CaptureButton
            | Element::UploadButton
            | Element::SwitchCameraButton => UiMode::Live,
            Element::PhotoOutput
            | Element::InfoOverlay
            | Element::RetakeButton
            | Element::DownloadButton => UiMode::Preview,
        }
    }
}

impl UiMode {
    pub fn is_visible(self, element: Element) -> bool {
        element.shown_in() == self
    }

    /// Elements shown in this mode
    pub fn visible_elements(self) -> Vec<Element> {
        Element::ALL
            .into_iter()
            .filter(|e| self.is_visible(*e))
            .collect()
    }
}

/// Side effect requested by a mode transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeEffect {
    /// Write the capture time into the overlay
    SetDisplayTime(String),
    /// Ask the map to recompute its layout once the container is shown
    RefreshMapAfter(Duration),
    /// Forget the selected upload so the same file counts as a new choice
    ClearFileSelection,
}

/// Rendering adapter: applies visibility to the host surface
pub trait ModeSurface {
    fn set_visible(&mut self, element: Element, visible: bool);
}

/// Two-state capture mode machine
#[derive(Debug, Clone)]
pub struct ModeController {
    mode: UiMode,
    map_refresh_delay: Duration,
}

impl ModeController {
    pub fn new(map_refresh_delay: Duration) -> Self {
        Self {
            mode: UiMode::Live,
            map_refresh_delay,
        }
    }

    pub fn mode(&self) -> UiMode {
        self.mode
    }

    /// Switch to preview after a successful crop
    pub fn enter_preview<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Vec<ModeEffect> {
        self.mode = UiMode::Preview;
        vec![
            ModeEffect::SetDisplayTime(time_format::format_display_time(now)),
            ModeEffect::RefreshMapAfter(self.map_refresh_delay),
        ]
    }

    /// Switch back to the viewfinder on retake
    pub fn enter_live(&mut self) -> Vec<ModeEffect> {
        self.mode = UiMode::Live;
        vec![ModeEffect::ClearFileSelection]
    }

    /// Push the current visibility to a surface
    pub fn apply_to(&self, surface: &mut impl ModeSurface) {
        for element in Element::ALL {
            surface.set_visible(element, self.mode.is_visible(element));
        }
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(crate::constants::timing::MAP_REFRESH_DELAY)
    }
}

/// Where a capture's pixels came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    /// Frame grabbed from the live stream
    LiveFrame,
    /// Image chosen by the user
    Upload,
}

/// Text shown in the info overlay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub coordinates: String,
    pub time: String,
    pub address: String,
    pub header: String,
}

/// One capture attempt, from crop to retake
#[derive(Debug, Clone)]
pub struct CaptureSession {
    id: Uuid,
    source: CaptureSource,
    front_facing: bool,
    cropped: RgbaImage,
    location: Option<Coordinate>,
    pub annotation: Annotation,
}

impl CaptureSession {
    pub fn new(source: CaptureSource, front_facing: bool, cropped: RgbaImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            front_facing,
            cropped,
            location: None,
            annotation: Annotation::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn source(&self) -> CaptureSource {
        self.source
    }

    pub fn is_front_facing(&self) -> bool {
        self.front_facing
    }

    pub fn cropped(&self) -> &RgbaImage {
        &self.cropped
    }

    pub fn location(&self) -> Option<Coordinate> {
        self.location
    }

    /// Record the capture position
    ///
    /// The first fix wins; later calls are ignored and return false.
    pub fn set_location(&mut self, coordinate: Coordinate) -> bool {
        if self.location.is_some() {
            return false;
        }
        self.location = Some(coordinate);
        true
    }
}
