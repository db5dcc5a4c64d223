// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Luminance auto-crop — a cheap guess at document margins for when no
// detector output is available. Each border band is compared with the centre
// of the photo; a band that looks different is assumed to be background and
// gets a wider margin.

use scanedit_core::CropRect;
use tracing::{debug, instrument};

use crate::raster::RasterImage;

/// Thickness of each border band, in pixels.
pub const BAND_SIZE: u32 = 20;
/// Mean-luminance difference above which a band counts as background.
pub const LUMINANCE_THRESHOLD: f64 = 15.0;
/// Margin for a side that resembles the centre.
pub const BASE_MARGIN: f32 = 0.10;
/// Margin for a side that differs from the centre.
pub const WIDE_MARGIN: f32 = 0.15;

/// Rec. 601 luma of an RGB triple.
fn luminance(px: [u8; 4]) -> f64 {
    0.299 * f64::from(px[0]) + 0.587 * f64::from(px[1]) + 0.114 * f64::from(px[2])
}

#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    count: u64,
}

impl Mean {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Mean luminance of the four border bands and the centre region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandLuminance {
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub centre: Option<f64>,
}

/// Accumulate band and centre luminance in one pass.
pub fn band_luminance(image: &RasterImage) -> BandLuminance {
    let (w, h) = image.dimensions();
    let (mut top, mut bottom, mut left, mut right, mut centre) =
        (Mean::default(), Mean::default(), Mean::default(), Mean::default(), Mean::default());

    let (cx0, cx1) = (f64::from(w) * 0.3, f64::from(w) * 0.7);
    let (cy0, cy1) = (f64::from(h) * 0.3, f64::from(h) * 0.7);

    for (i, px) in image.as_raw().chunks_exact(4).enumerate() {
        let x = (i as u64 % u64::from(w)) as u32;
        let y = (i as u64 / u64::from(w)) as u32;
        let lum = luminance([px[0], px[1], px[2], px[3]]);

        if y < BAND_SIZE {
            top.add(lum);
        } else if y > h.saturating_sub(BAND_SIZE) {
            bottom.add(lum);
        }
        if x < BAND_SIZE {
            left.add(lum);
        } else if x > w.saturating_sub(BAND_SIZE) {
            right.add(lum);
        }
        let (fx, fy) = (f64::from(x), f64::from(y));
        if fx > cx0 && fx < cx1 && fy > cy0 && fy < cy1 {
            centre.add(lum);
        }
    }

    BandLuminance {
        top: top.value(),
        bottom: bottom.value(),
        left: left.value(),
        right: right.value(),
        centre: centre.value(),
    }
}

/// Estimate crop margins from border/centre luminance contrast.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn estimate_crop(image: &RasterImage) -> CropRect {
    let (w, h) = (image.width() as f32, image.height() as f32);
    let bands = band_luminance(image);
    debug!(?bands, "band luminance");

    let differs = |band: Option<f64>| match (band, bands.centre) {
        (Some(b), Some(c)) => (b - c).abs() > LUMINANCE_THRESHOLD,
        _ => false,
    };
    let margin = |band: Option<f64>, extent: f32| {
        if differs(band) {
            extent * WIDE_MARGIN
        } else {
            extent * BASE_MARGIN
        }
    };

    CropRect {
        top: margin(bands.top, h),
        left: margin(bands.left, w),
        right: margin(bands.right, w),
        bottom: margin(bands.bottom, h),
    }
}
