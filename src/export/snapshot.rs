// SPDX-License-Identifier: GPL-3.0-only

//! Snapshot of the composed preview
//!
//! The host normally renders its own view tree to a bitmap. [`RasterSnapshot`]
//! is the built-in compositor for hosts without one: it scales the capture
//! and draws the info panel over its bottom edge. The panel (header, address,
//! coordinates, time, mini map marker) is built as SVG and rasterized with
//! resvg.

use crate::app::state::{Annotation, CaptureSession};
use crate::errors::RenderError;
use image::{Rgba, RgbaImage, imageops};
use resvg::usvg;
use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Largest canvas side a snapshot may produce
pub const MAX_CANVAS_SIDE: u32 = 16_384;

/// Share of the canvas height covered by the info overlay panel
const OVERLAY_HEIGHT_FRACTION: f32 = 0.28;

/// Opacity of the overlay panel
const OVERLAY_OPACITY: f32 = 0.45;

/// Everything visible in preview mode
#[derive(Debug, Clone)]
pub struct ComposedView {
    pub photo: RgbaImage,
    pub annotation: Annotation,
    /// Full document size, so content outside the scroll viewport is included
    pub document_width: u32,
    pub document_height: u32,
}

impl ComposedView {
    pub fn from_session(session: &CaptureSession) -> Self {
        let photo = session.cropped().clone();
        let (document_width, document_height) = photo.dimensions();
        Self {
            photo,
            annotation: session.annotation.clone(),
            document_width,
            document_height,
        }
    }
}

/// Options for a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotOptions {
    /// Include cross-origin images (map tiles)
    pub cross_origin: bool,
    /// Pixel density multiplier
    pub scale: f32,
    /// Canvas background; `None` keeps it transparent
    pub background: Option<Rgba<u8>>,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl SnapshotOptions {
    pub fn for_view(view: &ComposedView, scale: f32) -> Self {
        Self {
            cross_origin: true,
            scale,
            background: None,
            viewport_width: view.document_width,
            viewport_height: view.document_height,
        }
    }
}

/// View-to-bitmap collaborator
#[allow(async_fn_in_trait)]
pub trait SnapshotRenderer {
    async fn capture(
        &self,
        view: &ComposedView,
        options: &SnapshotOptions,
    ) -> Result<RgbaImage, RenderError>;
}

/// Built-in compositor: scaled photo plus translucent overlay panel
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterSnapshot;

impl RasterSnapshot {
    /// Compose synchronously
    pub fn compose(view: &ComposedView, options: &SnapshotOptions) -> Result<RgbaImage, RenderError> {
        if !(options.scale.is_finite() && options.scale > 0.0) {
            return Err(RenderError(format!("Invalid scale {}", options.scale)));
        }

        let width = (options.viewport_width as f32 * options.scale).round() as u64;
        let height = (options.viewport_height as f32 * options.scale).round() as u64;
        if width == 0 || height == 0 {
            return Err(RenderError("Nothing to render: empty viewport".to_string()));
        }
        if width > MAX_CANVAS_SIDE as u64 || height > MAX_CANVAS_SIDE as u64 {
            return Err(RenderError(format!(
                "Canvas {}x{} exceeds the maximum side of {}",
                width, height, MAX_CANVAS_SIDE
            )));
        }
        let (width, height) = (width as u32, height as u32);

        debug!(width, height, scale = options.scale, "Composing snapshot");

        let mut canvas = match options.background {
            Some(color) => RgbaImage::from_pixel(width, height, color),
            None => RgbaImage::new(width, height),
        };

        let photo = imageops::resize(&view.photo, width, height, imageops::FilterType::Triangle);
        imageops::overlay(&mut canvas, &photo, 0, 0);

        if has_annotation(&view.annotation) {
            let panel_height = ((height as f32 * OVERLAY_HEIGHT_FRACTION).round() as u32).max(1);
            let panel = render_panel(&view.annotation, width, panel_height)?;
            imageops::overlay(&mut canvas, &panel, 0, (height - panel_height) as i64);
        }

        Ok(canvas)
    }
}

fn has_annotation(annotation: &Annotation) -> bool {
    !(annotation.header.is_empty()
        && annotation.address.is_empty()
        && annotation.coordinates.is_empty()
        && annotation.time.is_empty())
}

/// System fonts, loaded once per process
fn font_database() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            debug!(faces = db.len(), "Loaded system fonts");
            Arc::new(db)
        })
        .clone()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// SVG markup of the info panel, `width`×`height` pixels
///
/// The mini map marker is only drawn once the capture has coordinates.
pub fn panel_svg(annotation: &Annotation, width: u32, height: u32) -> String {
    let (w, h) = (width as f32, height as f32);
    let pad = (h * 0.08).max(1.0);
    let mut svg = String::new();

    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );
    let _ = write!(
        svg,
        r#"<rect x="0" y="0" width="{w}" height="{h}" fill="black" fill-opacity="{OVERLAY_OPACITY}"/>"#
    );

    let mut text_x = pad;
    if !annotation.coordinates.is_empty() {
        let side = (h - 2.0 * pad).max(1.0);
        let (cx, cy) = (pad + side / 2.0, pad + side / 2.0);
        let stroke = (side * 0.03).max(0.5);
        let _ = write!(
            svg,
            r##"<rect x="{pad}" y="{pad}" width="{side}" height="{side}" fill="#3b5b45" stroke="white" stroke-width="{stroke}"/>"##
        );
        let _ = write!(
            svg,
            r#"<path d="M {pad} {cy} h {side} M {cx} {pad} v {side}" stroke="white" stroke-opacity="0.35" stroke-width="{stroke}"/>"#
        );
        let _ = write!(
            svg,
            r##"<circle cx="{cx}" cy="{cy}" r="{r}" fill="#e53935" stroke="white" stroke-width="{stroke}"/>"##,
            r = side * 0.08
        );
        text_x = pad * 2.0 + side;
    }

    let header_size = h * 0.16;
    let line_size = h * 0.11;
    let mut y = pad + header_size;
    let _ = write!(svg, r#"<g font-family="sans-serif" fill="white">"#);
    if !annotation.header.is_empty() {
        let _ = write!(
            svg,
            r#"<text x="{text_x}" y="{y}" font-size="{header_size}" font-weight="bold">{}</text>"#,
            escape_xml(&annotation.header)
        );
        y += line_size * 1.5;
    }
    for line in [&annotation.address, &annotation.coordinates, &annotation.time] {
        if line.is_empty() {
            continue;
        }
        let _ = write!(
            svg,
            r#"<text x="{text_x}" y="{y}" font-size="{line_size}">{}</text>"#,
            escape_xml(line)
        );
        y += line_size * 1.4;
    }
    svg.push_str("</g></svg>");
    svg
}

/// Rasterize the info panel
fn render_panel(annotation: &Annotation, width: u32, height: u32) -> Result<RgbaImage, RenderError> {
    let svg = panel_svg(annotation, width, height);
    let mut options = usvg::Options::default();
    options.fontdb = font_database();

    let tree = usvg::Tree::from_str(&svg, &options)
        .map_err(|e| RenderError(format!("Overlay markup rejected: {}", e)))?;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RenderError("Failed to allocate overlay pixmap".to_string()))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    // tiny-skia stores premultiplied RGBA
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(width, height, data)
        .ok_or_else(|| RenderError("Overlay buffer size mismatch".to_string()))
}

impl SnapshotRenderer for RasterSnapshot {
    async fn capture(
        &self,
        view: &ComposedView,
        options: &SnapshotOptions,
    ) -> Result<RgbaImage, RenderError> {
        let view = view.clone();
        let options = options.clone();
        let canvas = tokio::task::spawn_blocking(move || Self::compose(&view, &options))
            .await
            .map_err(|e| RenderError(format!("Snapshot task error: {}", e)))??;
        info!(width = canvas.width(), height = canvas.height(), "Snapshot rendered");
        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(annotated: bool) -> ComposedView {
        let mut annotation = Annotation::default();
        if annotated {
            annotation.address = "Somewhere".to_string();
        }
        ComposedView {
            photo: RgbaImage::from_pixel(10, 20, Rgba([255, 255, 255, 255])),
            annotation,
            document_width: 10,
            document_height: 20,
        }
    }

    #[test]
    fn test_scale_doubles_canvas() {
        let v = view(false);
        let canvas = RasterSnapshot::compose(&v, &SnapshotOptions::for_view(&v, 2.0)).unwrap();
        assert_eq!(canvas.dimensions(), (20, 40));
        assert_eq!(canvas.get_pixel(0, 39).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_overlay_panel_darkens_bottom() {
        let v = view(true);
        let canvas = RasterSnapshot::compose(&v, &SnapshotOptions::for_view(&v, 1.0)).unwrap();
        assert_eq!(canvas.get_pixel(5, 0).0, [255, 255, 255, 255]);
        assert!(canvas.get_pixel(5, 19)[0] < 255);
    }

    #[test]
    fn test_oversized_canvas_is_render_error() {
        let v = view(false);
        let options = SnapshotOptions {
            viewport_width: 10_000,
            ..SnapshotOptions::for_view(&v, 2.0)
        };
        assert!(RasterSnapshot::compose(&v, &options).is_err());
    }

    #[test]
    fn test_options_request_cors_and_transparency() {
        let v = view(false);
        let options = SnapshotOptions::for_view(&v, 2.0);
        assert!(options.cross_origin);
        assert_eq!(options.background, None);
        assert_eq!((options.viewport_width, options.viewport_height), (10, 20));
    }

    fn full_annotation() -> Annotation {
        Annotation {
            coordinates: "Lat -7.7713847° Long 110.3774998°".to_string(),
            time: "Sunday, 18/10/2026 04:07 AM GMT +07:00".to_string(),
            address: "Bulaksumur, Sleman & DIY".to_string(),
            header: "Universitas Gadjah Mada, DIY".to_string(),
        }
    }

    #[test]
    fn test_panel_shows_annotation_and_map() {
        let v = ComposedView {
            photo: RgbaImage::from_pixel(200, 300, Rgba([128, 128, 128, 255])),
            annotation: full_annotation(),
            document_width: 200,
            document_height: 300,
        };
        let canvas = RasterSnapshot::compose(&v, &SnapshotOptions::for_view(&v, 1.0)).unwrap();

        let panel_top = 300 - (300.0 * OVERLAY_HEIGHT_FRACTION).round() as u32;
        let first = *canvas.get_pixel(0, panel_top);
        let uniform = (panel_top..300)
            .flat_map(|y| (0..200).map(move |x| (x, y)))
            .all(|(x, y)| *canvas.get_pixel(x, y) == first);
        assert!(!uniform, "panel should carry the map marker and text");

        // Photo above the panel is untouched
        assert_eq!(canvas.get_pixel(100, 10).0, [128, 128, 128, 255]);
    }

    #[test]
    fn test_panel_markup_escapes_text() {
        let svg = panel_svg(&full_annotation(), 400, 120);
        assert!(svg.contains("Bulaksumur, Sleman &amp; DIY"));
        assert!(svg.contains("Lat -7.7713847° Long 110.3774998°"));
        assert!(svg.contains("<circle"));
        assert!(usvg::Tree::from_str(&svg, &usvg::Options::default()).is_ok());
    }

    #[test]
    fn test_no_marker_without_coordinates() {
        let annotation = Annotation {
            coordinates: String::new(),
            ..full_annotation()
        };
        assert!(!panel_svg(&annotation, 400, 120).contains("<circle"));
    }
}
