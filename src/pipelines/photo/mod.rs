// SPDX-License-Identifier: GPL-3.0-only

//! Photo pipeline: viewport crop and encoding
//!
//! Cropping is synchronous and never suspends, so a capture always has its
//! bitmap before the preview is entered. Encoding runs on the blocking pool.

pub mod crop;
pub mod encoding;

pub use crop::{CropRect, PixelRect, ViewRect, compute_crop, crop_to_viewport};
pub use encoding::{EncodedImage, PhotoEncoder};
