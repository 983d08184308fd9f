// SPDX-License-Identifier: GPL-3.0-only

//! JPEG encoding of composed snapshots
//!
//! Snapshots are RGBA with a transparent background. JPEG has no alpha, so
//! translucent pixels are flattened onto black, which is what a canvas does
//! when it is serialized to JPEG.

use crate::errors::RenderError;
use image::{RgbImage, RgbaImage};
use tracing::{debug, info};

/// Encoded image data ready for download
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// JPEG encoder with a fixed quality
#[derive(Debug, Clone, Copy)]
pub struct PhotoEncoder {
    quality: u8,
}

impl PhotoEncoder {
    /// Create an encoder with the given JPEG quality (clamped to 1-100)
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode a snapshot on the blocking pool
    pub async fn encode(&self, image: RgbaImage) -> Result<EncodedImage, RenderError> {
        info!(
            width = image.width(),
            height = image.height(),
            quality = self.quality,
            "Starting encoding"
        );

        let quality = self.quality;
        tokio::task::spawn_blocking(move || Self::encode_jpeg(&image, quality))
            .await
            .map_err(|e| RenderError(format!("Encoding task error: {}", e)))?
    }

    /// Encode synchronously
    pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<EncodedImage, RenderError> {
        let rgb = flatten_rgba(image);
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);

        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
        encoder
            .encode(
                rgb.as_raw(),
                rgb.width(),
                rgb.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| RenderError(format!("JPEG encoding failed: {}", e)))?;

        debug!(size = buffer.len(), "Encoding complete");

        Ok(EncodedImage {
            data: buffer,
            width: rgb.width(),
            height: rgb.height(),
        })
    }
}

/// Drop alpha by compositing over black
pub fn flatten_rgba(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let scale = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        image::Rgb([scale(r), scale(g), scale(b)])
    })
}
