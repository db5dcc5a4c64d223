// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster buffer — an owned RGBA8 pixel grid that every operator reads and
// produces. Decoding and encoding go through the `image` crate.

use image::buffer::ConvertBuffer;
use image::{ImageFormat, Rgba, RgbImage, RgbaImage};
use scanedit_core::Quality;
use scanedit_core::error::{Result, ScanEditError};
use tracing::{debug, instrument};

/// Number of 8-bit samples per pixel.
pub const CHANNELS: usize = 4;

/// An owned, row-major RGBA8 image.
///
/// The backing buffer always holds exactly `width * height * 4` bytes.
/// Operators never mutate a `RasterImage` they were handed; they build a new
/// one.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl RasterImage {
    // -- Construction ---------------------------------------------------------

    /// An image of the given size filled with one colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            pixels: RgbaImage::from_pixel(width, height, Rgba(rgba)),
        })
    }

    /// Wrap a raw RGBA8 buffer, checking its length against the dimensions.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(ScanEditError::InvalidParameter {
                name: "buffer",
                detail: format!("expected {expected} bytes for {width}x{height}, got {}", data.len()),
            });
        }
        let pixels = RgbaImage::from_raw(width, height, data).ok_or_else(|| {
            ScanEditError::InvalidParameter {
                name: "buffer",
                detail: "buffer does not match dimensions".into(),
            }
        })?;
        Ok(Self { pixels })
    }

    /// Build an image by evaluating `f` at every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            pixels: RgbaImage::from_fn(width, height, |x, y| Rgba(f(x, y))),
        })
    }

    /// Decode encoded bytes (JPEG, PNG, ...) into an RGBA raster.
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(data)
            .map_err(|err| ScanEditError::Decode(format!("failed to decode image: {err}")))?;
        let pixels = decoded.to_rgba8();
        check_dimensions(pixels.width(), pixels.height())
            .map_err(|_| ScanEditError::Decode("decoded image is empty".into()))?;
        debug!(width = pixels.width(), height = pixels.height(), "image decoded");
        Ok(Self { pixels })
    }

    pub(crate) fn from_buffer(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Raw row-major RGBA bytes.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// The pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixels.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// Overwrite one pixel, failing outside the image.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) -> Result<()> {
        let (w, h) = self.dimensions();
        match self.pixels.get_pixel_mut_checked(x, y) {
            Some(px) => {
                px.0 = rgba;
                Ok(())
            }
            None => Err(ScanEditError::InvalidParameter {
                name: "pixel",
                detail: format!("({x}, {y}) is outside {w}x{h}"),
            }),
        }
    }

    pub(crate) fn buffer(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Apply `f` to every pixel independently, producing a new image.
    pub fn map_pixels(&self, f: impl Fn([u8; 4]) -> [u8; 4]) -> Self {
        let mut out = self.pixels.clone();
        for px in out.pixels_mut() {
            px.0 = f(px.0);
        }
        Self { pixels: out }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode as JPEG at `quality`. Alpha is dropped.
    pub fn encode_jpeg(&self, quality: Quality) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let rgb: RgbImage = self.pixels.convert();
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality.value());
        rgb.write_with_encoder(encoder)
            .map_err(|err| ScanEditError::Encode(format!("JPEG encoding failed: {err}")))?;
        Ok(buffer)
    }

    /// Encode losslessly as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.pixels
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| ScanEditError::Encode(format!("PNG encoding failed: {err}")))?;
        Ok(buffer)
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ScanEditError::InvalidParameter {
            name: "dimensions",
            detail: format!("{width}x{height} has no pixels"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_length_is_checked() {
        assert!(RasterImage::from_rgba(2, 2, vec![0; 16]).is_ok());
        assert!(RasterImage::from_rgba(2, 2, vec![0; 15]).is_err());
        assert!(RasterImage::filled(0, 5, [0; 4]).is_err());
    }

    #[test]
    fn pixel_access_is_bounds_checked() {
        let mut img = RasterImage::filled(3, 2, [1, 2, 3, 4]).unwrap();
        assert_eq!(img.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(img.pixel(3, 0), None);
        img.set_pixel(0, 0, [9, 9, 9, 9]).unwrap();
        assert_eq!(img.pixel(0, 0), Some([9, 9, 9, 9]));
        assert!(img.set_pixel(0, 2, [0; 4]).is_err());
    }

    #[test]
    fn png_survives_decode() {
        let img = RasterImage::from_fn(4, 3, |x, y| [x as u8 * 10, y as u8 * 20, 7, 255]).unwrap();
        let decoded = RasterImage::decode(&img.encode_png().unwrap()).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn jpeg_output_decodes_with_same_size() {
        let img = RasterImage::filled(16, 8, [200, 100, 50, 255]).unwrap();
        let bytes = img.encode_jpeg(Quality::new(80).unwrap()).unwrap();
        assert_eq!(RasterImage::decode(&bytes).unwrap().dimensions(), (16, 8));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = RasterImage::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ScanEditError::Decode(_)));
    }
}
