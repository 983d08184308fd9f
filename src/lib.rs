// SPDX-License-Identifier: GPL-3.0-only

//! Geo camera - viewport-matched photo capture with a location overlay
//!
//! Captures a photo from a live camera feed or an uploaded file, crops it to
//! the viewfinder's aspect ratio, annotates it with where and when it was
//! taken, and exports the composed preview as a single JPEG.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: capture/preview mode machine and the operations driving it
//! - [`backends`]: camera collaborator abstraction and stream ownership
//! - [`pipelines`]: viewport crop and JPEG encoding
//! - [`location`]: geolocation, reverse geocoding, mini map, annotation
//! - [`export`]: composite snapshot and download delivery
//! - [`time_format`]: overlay timestamps and file name tokens
//! - [`config`]: user configuration handling
//!
//! Host capabilities (camera device, GPS, map tiles, view snapshots) are
//! traits; the crate ships file- and network-backed implementations used by
//! the `geocam` command line front end.

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod export;
pub mod location;
pub mod notify;
pub mod pipelines;
pub mod time_format;

// Re-export commonly used types
pub use app::{AppModel, Platform, PlatformParts, UiMode};
pub use config::Config;
pub use errors::{AppError, AppResult, ErrorKind};
pub use location::Coordinate;
pub use pipelines::photo::{CropRect, ViewRect, compute_crop, crop_to_viewport};
