// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Geometric operators — crop to margins, quarter-turn rotation and
// percentage scaling.

use image::imageops::{self, FilterType};
use scanedit_core::error::{Result, ScanEditError};
use scanedit_core::types::adjustment_bounds::NATIVE_RESOLUTION;
use scanedit_core::{CropRect, Rotation};
use tracing::{debug, info, instrument};

use crate::raster::RasterImage;

/// Crop `image` to the region left inside `rect`'s margins.
///
/// Margins are rounded to whole pixels. Fails with `InvalidCrop` when a
/// margin is negative or the kept region would be empty. Pixels outside the
/// region are discarded, never padded.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn crop(image: &RasterImage, rect: &CropRect) -> Result<RasterImage> {
    let (width, height) = image.dimensions();
    let margins = [rect.top, rect.left, rect.right, rect.bottom].map(|m| m.round() as i64);
    let [top, left, right, bottom] = margins;

    if margins.iter().any(|&m| m < 0) {
        return Err(ScanEditError::InvalidCrop(format!(
            "negative margin in {rect:?}"
        )));
    }

    let crop_w = i64::from(width) - left - right;
    let crop_h = i64::from(height) - top - bottom;
    if crop_w <= 0 || crop_h <= 0 {
        return Err(ScanEditError::InvalidCrop(format!(
            "crop area {crop_w}x{crop_h} is empty for a {width}x{height} image"
        )));
    }

    info!(left, top, crop_w, crop_h, "cropping image");
    let view = imageops::crop_imm(
        image.buffer(),
        left as u32,
        top as u32,
        crop_w as u32,
        crop_h as u32,
    );
    Ok(RasterImage::from_buffer(view.to_image()))
}

/// Rotate clockwise by a quarter-turn multiple. Pixels are remapped exactly;
/// 90 and 270 swap width and height.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn rotate(image: &RasterImage, rotation: Rotation) -> RasterImage {
    let buffer = image.buffer();
    match rotation {
        Rotation::Deg0 => image.clone(),
        Rotation::Deg90 => RasterImage::from_buffer(imageops::rotate90(buffer)),
        Rotation::Deg180 => RasterImage::from_buffer(imageops::rotate180(buffer)),
        Rotation::Deg270 => RasterImage::from_buffer(imageops::rotate270(buffer)),
    }
}

/// Output dimensions for a resolution percentage; never below one pixel.
pub fn scaled_dimensions(width: u32, height: u32, percent: u16) -> (u32, u32) {
    let factor = f64::from(percent) / 100.0;
    let scale = |v: u32| ((f64::from(v) * factor).round() as u32).max(1);
    (scale(width), scale(height))
}

/// Resample to `percent` of the current size with bilinear filtering.
/// 100% returns an identical copy.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn scale(image: &RasterImage, percent: u16) -> RasterImage {
    if percent == NATIVE_RESOLUTION {
        return image.clone();
    }
    let (new_w, new_h) = scaled_dimensions(image.width(), image.height(), percent);
    debug!(new_w, new_h, "resampling");
    RasterImage::from_buffer(imageops::resize(
        image.buffer(),
        new_w,
        new_h,
        FilterType::Triangle,
    ))
}
