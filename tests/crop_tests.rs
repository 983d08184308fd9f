// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the viewport crop

use geocam::{ViewRect, compute_crop, crop_to_viewport};
use image::{Rgba, RgbaImage};

const SOURCES: [(f64, f64); 5] = [
    (1920.0, 1080.0),
    (1080.0, 1920.0),
    (3840.0, 2160.0),
    (640.0, 480.0),
    (1000.0, 1000.0),
];

const VIEWS: [(f64, f64); 5] = [
    (360.0, 640.0),
    (1280.0, 720.0),
    (500.0, 500.0),
    (390.0, 844.0),
    (1024.0, 300.0),
];

#[test]
fn test_crop_matches_view_ratio() {
    for (sw, sh) in SOURCES {
        for (vw, vh) in VIEWS {
            let view = ViewRect::new(vw, vh);
            let crop = compute_crop(sw, sh, view);
            assert!(
                (crop.aspect_ratio() - view.ratio()).abs() < 1e-9,
                "{}x{} in {}x{}: ratio {} != {}",
                sw,
                sh,
                vw,
                vh,
                crop.aspect_ratio(),
                view.ratio()
            );
        }
    }
}

#[test]
fn test_crop_stays_inside_source_and_is_centered() {
    for (sw, sh) in SOURCES {
        for (vw, vh) in VIEWS {
            let crop = compute_crop(sw, sh, ViewRect::new(vw, vh));
            assert!(crop.x >= 0.0 && crop.y >= 0.0);
            assert!(crop.x + crop.width <= sw + 1e-9);
            assert!(crop.y + crop.height <= sh + 1e-9);
            // One dimension always spans the whole source
            assert!(crop.width == sw || crop.height == sh);
            assert!((crop.x * 2.0 + crop.width - sw).abs() < 1e-9);
            assert!((crop.y * 2.0 + crop.height - sh).abs() < 1e-9);
        }
    }
}

#[test]
fn test_portrait_view_on_landscape_source() {
    let crop = compute_crop(1920.0, 1080.0, ViewRect::new(360.0, 640.0));
    assert_eq!(crop.height, 1080.0);
    assert_eq!(crop.width, 607.5);
    assert_eq!(crop.x, 656.25);
    assert_eq!(crop.y, 0.0);
}

#[test]
fn test_degenerate_view_uses_square() {
    let crop = compute_crop(1920.0, 1080.0, ViewRect::new(0.0, 0.0));
    assert_eq!(crop.width, crop.height);
    assert_eq!(crop.height, 1080.0);
}

#[test]
fn test_cropped_bitmap_dimensions() {
    let source = RgbaImage::from_pixel(1920, 1080, Rgba([10, 20, 30, 255]));
    let cropped = crop_to_viewport(&source, ViewRect::new(360.0, 640.0), false);
    assert_eq!(cropped.dimensions(), (607, 1080));
}

#[test]
fn test_mirrored_crop_is_flipped() {
    let mut source = RgbaImage::from_pixel(400, 200, Rgba([0, 0, 0, 255]));
    // Mark the leftmost column of the centered 200x200 crop
    for y in 0..200 {
        source.put_pixel(100, y, Rgba([255, 0, 0, 255]));
    }

    let plain = crop_to_viewport(&source, ViewRect::new(100.0, 100.0), false);
    let mirrored = crop_to_viewport(&source, ViewRect::new(100.0, 100.0), true);

    assert_eq!(plain.get_pixel(0, 50).0, [255, 0, 0, 255]);
    assert_eq!(mirrored.get_pixel(199, 50).0, [255, 0, 0, 255]);
    assert_eq!(mirrored.get_pixel(0, 50).0, [0, 0, 0, 255]);
}
