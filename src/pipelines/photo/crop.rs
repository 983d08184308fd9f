// SPDX-License-Identifier: GPL-3.0-only

//! Center crop to the viewfinder's aspect ratio
//!
//! The saved photo must show exactly what the viewfinder showed, not the
//! sensor's native ratio. The crop only ever removes pixels: the output is
//! never larger than the source in either dimension.

use image::RgbaImage;
use image::imageops;
use tracing::debug;

/// Size of the viewfinder element, sampled at capture time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
    pub width: f64,
    pub height: f64,
}

impl ViewRect {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when the element has not been laid out yet
    pub fn is_degenerate(&self) -> bool {
        !(positive(self.width) && positive(self.height))
    }

    /// Width over height, substituting 1 for a zero side
    pub fn ratio(&self) -> f64 {
        or_one(self.width) / or_one(self.height)
    }
}

/// Source sub-rectangle selected for output, in source pixel space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Snap to whole pixels inside a `source_width`×`source_height` image
    ///
    /// Sizes truncate like a canvas dimension assignment does; offsets round
    /// to the nearest pixel and are clamped so the rectangle stays inside.
    pub fn to_pixels(&self, source_width: u32, source_height: u32) -> PixelRect {
        let width = (self.width as u32).clamp(1, source_width.max(1));
        let height = (self.height as u32).clamp(1, source_height.max(1));
        let x = (self.x.round().max(0.0) as u32).min(source_width.saturating_sub(width));
        let y = (self.y.round().max(0.0) as u32).min(source_height.saturating_sub(height));
        PixelRect {
            x,
            y,
            width,
            height,
        }
    }
}

/// Integer crop rectangle actually copied out of the source bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

fn or_one(v: f64) -> f64 {
    if positive(v) { v } else { 1.0 }
}

/// Compute the centered crop of a `source_width`×`source_height` image that
/// matches the view's aspect ratio
///
/// A source wider than the view loses columns on both sides; otherwise it
/// loses rows top and bottom. Zero sizes on either side are treated as 1.
pub fn compute_crop(source_width: f64, source_height: f64, view: ViewRect) -> CropRect {
    let view_ratio = view.ratio();
    let source_width = or_one(source_width);
    let source_height = or_one(source_height);
    let source_ratio = source_width / source_height;

    if source_ratio > view_ratio {
        let width = source_height * view_ratio;
        CropRect {
            x: (source_width - width) / 2.0,
            y: 0.0,
            width,
            height: source_height,
        }
    } else {
        let height = source_width / view_ratio;
        CropRect {
            x: 0.0,
            y: (source_height - height) / 2.0,
            width: source_width,
            height,
        }
    }
}

/// Crop `media` to the view's aspect ratio, flipping horizontally when
/// `mirror` is set
///
/// Pixels are copied 1:1 from the source; nothing is resampled. Mirroring is
/// meant for front camera frames so the result matches the mirrored preview.
pub fn crop_to_viewport(media: &RgbaImage, view: ViewRect, mirror: bool) -> RgbaImage {
    let (source_width, source_height) = media.dimensions();
    let rect = compute_crop(source_width as f64, source_height as f64, view);
    let pixels = rect.to_pixels(source_width, source_height);

    if view.is_degenerate() {
        debug!(
            view_width = view.width,
            view_height = view.height,
            "Viewfinder not laid out, substituting unit size"
        );
    }
    debug!(
        source_width,
        source_height,
        x = pixels.x,
        y = pixels.y,
        width = pixels.width,
        height = pixels.height,
        mirror,
        "Cropping to viewport"
    );

    if media.width() == 0 || media.height() == 0 {
        return RgbaImage::new(pixels.width, pixels.height);
    }

    let cropped = imageops::crop_imm(media, pixels.x, pixels.y, pixels.width, pixels.height)
        .to_image();

    if mirror {
        imageops::flip_horizontal(&cropped)
    } else {
        cropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const EPSILON: f64 = 1e-6;

    #[test]
    fn test_portrait_view_over_landscape_source() {
        let rect = compute_crop(1920.0, 1080.0, ViewRect::new(360.0, 640.0));
        assert!((rect.height - 1080.0).abs() < EPSILON);
        assert!((rect.width - 607.5).abs() < EPSILON);
        assert!((rect.x - 656.25).abs() < EPSILON);
        assert_eq!(rect.y, 0.0);
    }

    #[test]
    fn test_landscape_view_over_portrait_source() {
        let rect = compute_crop(1080.0, 1920.0, ViewRect::new(640.0, 360.0));
        assert_eq!(rect.x, 0.0);
        assert!((rect.width - 1080.0).abs() < EPSILON);
        assert!((rect.height - 607.5).abs() < EPSILON);
        assert!((rect.y - 656.25).abs() < EPSILON);
    }

    #[test]
    fn test_equal_ratio_keeps_full_frame() {
        let rect = compute_crop(1600.0, 900.0, ViewRect::new(320.0, 180.0));
        assert_eq!(
            rect,
            CropRect {
                x: 0.0,
                y: 0.0,
                width: 1600.0,
                height: 900.0
            }
        );
    }

    #[test]
    fn test_zero_view_substitutes_unit_side() {
        let view = ViewRect::new(0.0, 0.0);
        assert!(view.is_degenerate());
        assert_eq!(view.ratio(), 1.0);

        let rect = compute_crop(400.0, 200.0, view);
        assert!((rect.width - 200.0).abs() < EPSILON);
        assert!((rect.height - 200.0).abs() < EPSILON);
    }

    #[test]
    fn test_pixel_rect_stays_inside_source() {
        let rect = compute_crop(1920.0, 1080.0, ViewRect::new(360.0, 640.0));
        let px = rect.to_pixels(1920, 1080);
        assert_eq!(px.width, 607);
        assert_eq!(px.height, 1080);
        assert_eq!(px.x, 656);
        assert!(px.x + px.width <= 1920);
    }

    #[test]
    fn test_crop_copies_center_pixels() {
        let source = RgbaImage::from_fn(8, 4, |x, _| Rgba([x as u8, 0, 0, 255]));
        let out = crop_to_viewport(&source, ViewRect::new(100.0, 100.0), false);
        assert_eq!(out.dimensions(), (4, 4));
        assert_eq!(out.get_pixel(0, 0)[0], 2);
        assert_eq!(out.get_pixel(3, 3)[0], 5);
    }

    #[test]
    fn test_mirror_is_flip_of_plain_crop() {
        let source = RgbaImage::from_fn(30, 20, |x, y| Rgba([x as u8, y as u8, 7, 255]));
        let view = ViewRect::new(9.0, 16.0);
        let plain = crop_to_viewport(&source, view, false);
        let mirrored = crop_to_viewport(&source, view, true);

        assert_eq!(plain.dimensions(), mirrored.dimensions());
        let w = plain.width();
        for y in 0..plain.height() {
            for x in 0..w {
                assert_eq!(plain.get_pixel(x, y), mirrored.get_pixel(w - 1 - x, y));
            }
        }
    }
}
