// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral validation and seeding. A detector's corners are only trusted
// when they are well separated and enclose a reasonable share of the photo;
// otherwise a centred heuristic box stands in.

use scanedit_core::error::{Result, ScanEditError};
use scanedit_core::{CropRect, Detection, Point, Quadrilateral, ScanConfig, min_dimension};
use tracing::{debug, warn};

/// Share of each dimension covered by the fallback perspective box.
pub const PERSPECTIVE_FALLBACK_FRACTION: f32 = 0.70;
/// Share of each dimension covered by the fallback crop box.
pub const CROP_FALLBACK_FRACTION: f32 = 0.75;
/// Margin added around detected corners when seeding a crop, per axis.
pub const DETECTED_CROP_MARGIN: f32 = 0.02;
/// Uniform inset of the initial crop, relative to `min(width, height)`.
pub const INITIAL_CROP_INSET: f32 = 0.10;

/// Thresholds a quadrilateral must meet to be trusted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadPolicy {
    /// Minimum corner separation, fraction of `min(width, height)`.
    pub min_corner_fraction: f32,
    /// Minimum enclosed area, fraction of `width * height`.
    pub min_area_fraction: f32,
}

impl Default for QuadPolicy {
    fn default() -> Self {
        Self {
            min_corner_fraction: 0.10,
            min_area_fraction: 0.20,
        }
    }
}

impl From<&ScanConfig> for QuadPolicy {
    fn from(config: &ScanConfig) -> Self {
        Self {
            min_corner_fraction: config.min_corner_fraction,
            min_area_fraction: config.min_quad_area_fraction,
        }
    }
}

/// Where a seeded quadrilateral or crop came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSource {
    Detected,
    Fallback,
}

/// Reject quadrilaterals that leave the image, have crowded corners or
/// enclose too little area.
pub fn validate_quadrilateral(
    quad: &Quadrilateral,
    width: u32,
    height: u32,
    policy: &QuadPolicy,
) -> Result<()> {
    if quad.corners.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(ScanEditError::InvalidQuadrilateral("non-finite corner".into()));
    }

    let (w, h) = (width as f32, height as f32);
    if let Some(p) = quad
        .corners
        .iter()
        .find(|p| !(0.0..=w).contains(&p.x) || !(0.0..=h).contains(&p.y))
    {
        return Err(ScanEditError::InvalidQuadrilateral(format!(
            "corner ({:.1}, {:.1}) lies outside the {width}x{height} image",
            p.x, p.y
        )));
    }

    let min_distance = min_dimension(width, height) * policy.min_corner_fraction;
    let closest = quad.min_corner_distance();
    if closest < min_distance {
        return Err(ScanEditError::InvalidQuadrilateral(format!(
            "corners {closest:.1}px apart, need {min_distance:.1}px"
        )));
    }

    let min_area = width as f32 * height as f32 * policy.min_area_fraction;
    let area = quad.area();
    if area < min_area {
        return Err(ScanEditError::InvalidQuadrilateral(format!(
            "area {area:.0} is below {min_area:.0}"
        )));
    }
    Ok(())
}

/// Order four loose points as TL, TR, BL, BR by their quadrant around the
/// centroid; points sharing a quadrant are ordered by distance from it.
pub fn sort_corners(points: [Point; 4]) -> Quadrilateral {
    let cx = points.iter().map(|p| p.x).sum::<f32>() / 4.0;
    let cy = points.iter().map(|p| p.y).sum::<f32>() / 4.0;
    let centre = Point::new(cx, cy);

    let quadrant = |p: &Point| match (p.x < cx, p.y < cy) {
        (true, true) => 0,
        (false, true) => 1,
        (true, false) => 2,
        (false, false) => 3,
    };

    let mut sorted = points;
    sorted.sort_by(|a, b| {
        quadrant(a).cmp(&quadrant(b)).then_with(|| {
            a.distance(&centre)
                .partial_cmp(&b.distance(&centre))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });
    Quadrilateral::new(sorted)
}

/// Perspective corners to start editing from: the sorted detected corners if
/// they pass validation, else the centred 70% box.
pub fn seed_perspective(
    detection: &Detection,
    width: u32,
    height: u32,
    policy: &QuadPolicy,
) -> (Quadrilateral, SeedSource) {
    if let Some(quad) = detection.quadrilateral() {
        let sorted = sort_corners(quad.corners);
        match validate_quadrilateral(&sorted, width, height, policy) {
            Ok(()) => {
                debug!(?sorted, "using detected corners");
                return (sorted, SeedSource::Detected);
            }
            Err(err) => warn!(%err, "detected corners rejected, using fallback box"),
        }
    }
    (
        Quadrilateral::centered_box(width, height, PERSPECTIVE_FALLBACK_FRACTION),
        SeedSource::Fallback,
    )
}

/// Crop margins derived from a trusted detection: the corners' bounding box
/// grown by 2% per axis, clamped to the image. Falls back to the centred 75%
/// box.
pub fn seed_crop(
    detection: &Detection,
    width: u32,
    height: u32,
    policy: &QuadPolicy,
) -> (CropRect, SeedSource) {
    if let Some(quad) = detection.quadrilateral() {
        let sorted = sort_corners(quad.corners);
        match validate_quadrilateral(&sorted, width, height, policy) {
            Ok(()) => {
                let (x0, y0, x1, y1) = sorted.bounding_box();
                let mx = width as f32 * DETECTED_CROP_MARGIN;
                let my = height as f32 * DETECTED_CROP_MARGIN;
                let rect = CropRect {
                    top: (y0 - my).max(0.0),
                    left: (x0 - mx).max(0.0),
                    right: (width as f32 - x1 - mx).max(0.0),
                    bottom: (height as f32 - y1 - my).max(0.0),
                };
                return (rect, SeedSource::Detected);
            }
            Err(err) => warn!(%err, "detected corners rejected, using smart crop"),
        }
    }
    (smart_crop(width, height), SeedSource::Fallback)
}

/// Centred box covering 75% of each dimension.
pub fn smart_crop(width: u32, height: u32) -> CropRect {
    let (x0, y0, x1, y1) =
        Quadrilateral::centered_box(width, height, CROP_FALLBACK_FRACTION).bounding_box();
    CropRect::from_bounds(x0, y0, x1, y1, width, height)
}

/// Crop rectangle shown before the user touches anything.
pub fn initial_crop(width: u32, height: u32) -> CropRect {
    CropRect::uniform(min_dimension(width, height) * INITIAL_CROP_INSET)
}
