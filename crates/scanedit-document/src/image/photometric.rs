// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Photometric operators — colour mode, brightness and contrast. Each pixel is
// transformed independently; alpha is never touched.

use scanedit_core::types::adjustment_bounds::NEUTRAL_LEVEL;
use scanedit_core::{AdjustmentParams, ColorMode};
use tracing::{debug, instrument};

use crate::raster::RasterImage;

/// Binarisation threshold for monochrome mode.
pub const MONOCHROME_THRESHOLD: f32 = 128.0;

/// Slider units to channel units: 50 slider steps span ±127.5.
const LEVEL_SCALE: f32 = 2.55;

/// Average of the three colour channels.
fn channel_mean(r: u8, g: u8, b: u8) -> f32 {
    (f32::from(r) + f32::from(g) + f32::from(b)) / 3.0
}

fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Replace each colour channel with the mean of R, G and B.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn grayscale(image: &RasterImage) -> RasterImage {
    image.map_pixels(|[r, g, b, a]| {
        let gray = to_channel(channel_mean(r, g, b));
        [gray, gray, gray, a]
    })
}

/// Binarise on the channel mean: above 128 becomes white, the rest black.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn monochrome(image: &RasterImage) -> RasterImage {
    image.map_pixels(|[r, g, b, a]| {
        let v = if channel_mean(r, g, b) > MONOCHROME_THRESHOLD {
            255
        } else {
            0
        };
        [v, v, v, a]
    })
}

/// Channel offset for a brightness slider value.
pub fn brightness_offset(level: u8) -> f32 {
    (f32::from(level) - f32::from(NEUTRAL_LEVEL)) * LEVEL_SCALE
}

/// Contrast multiplier for a contrast slider value.
///
/// The slider is centred the same way as brightness, giving a signed amount
/// `c` in ±127.5 that feeds `259(c + 255) / (255(259 - c))`. The neutral
/// position yields exactly 1.0.
pub fn contrast_factor(level: u8) -> f32 {
    let c = (f32::from(level) - f32::from(NEUTRAL_LEVEL)) * LEVEL_SCALE;
    (259.0 * (c + 255.0)) / (255.0 * (259.0 - c))
}

/// Add a brightness offset, then stretch around mid-grey by the contrast
/// factor. Rounds and clamps after each step.
fn tone_channel(value: u8, offset: f32, factor: f32) -> u8 {
    let brightened = to_channel(f32::from(value) + offset);
    to_channel(factor * (f32::from(brightened) - 128.0) + 128.0)
}

/// Apply brightness then contrast from slider values.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn adjust_tone(image: &RasterImage, brightness: u8, contrast: u8) -> RasterImage {
    let offset = brightness_offset(brightness);
    let factor = contrast_factor(contrast);
    debug!(offset, factor, "tone curve");
    image.map_pixels(|[r, g, b, a]| {
        [
            tone_channel(r, offset, factor),
            tone_channel(g, offset, factor),
            tone_channel(b, offset, factor),
            a,
        ]
    })
}

/// Run the photometric stage: colour mode first, then brightness and
/// contrast. Neutral steps are skipped; they would not change any pixel.
pub fn apply_photometric(image: &RasterImage, params: &AdjustmentParams) -> RasterImage {
    let converted = match params.color_mode {
        ColorMode::Color => None,
        ColorMode::Grayscale => Some(grayscale(image)),
        ColorMode::Monochrome => Some(monochrome(image)),
    };
    if params.is_tone_neutral() {
        return converted.unwrap_or_else(|| image.clone());
    }
    let base = converted.as_ref().unwrap_or(image);
    adjust_tone(base, params.brightness, params.contrast)
}
