// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanedit editing pipeline.
//
// All coordinates are in source-image pixel space unless stated otherwise.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ScanEditError};

/// Unique identifier for an exported artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId(pub Uuid);

impl ArtifactId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -- Points and rectangles ----------------------------------------------------

/// A point in image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Crop rectangle expressed as margins measured inward from each image edge.
///
/// A margin of zero keeps the full extent on that side. The kept region is
/// `[left, top, width - right, height - bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CropRect {
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

impl CropRect {
    pub const fn new(top: f32, left: f32, right: f32, bottom: f32) -> Self {
        Self {
            top,
            left,
            right,
            bottom,
        }
    }

    /// Same margin on all four sides.
    pub const fn uniform(inset: f32) -> Self {
        Self::new(inset, inset, inset, inset)
    }

    /// Build margins from an absolute box `[x0, y0, x1, y1)` inside an image.
    pub fn from_bounds(x0: f32, y0: f32, x1: f32, y1: f32, width: u32, height: u32) -> Self {
        Self {
            top: y0,
            left: x0,
            right: width as f32 - x1,
            bottom: height as f32 - y1,
        }
    }

    /// Width and height of the kept region for an image of the given size.
    pub fn kept_size(&self, width: u32, height: u32) -> (f32, f32) {
        (
            width as f32 - self.left - self.right,
            height as f32 - self.top - self.bottom,
        )
    }

    /// Whether every margin is non-negative and the kept region is non-empty.
    pub fn is_inside(&self, width: u32, height: u32) -> bool {
        let (w, h) = self.kept_size(width, height);
        self.top >= 0.0 && self.left >= 0.0 && self.right >= 0.0 && self.bottom >= 0.0 && w > 0.0 && h > 0.0
    }

    /// Check the rectangle against an image, requiring the kept region to be
    /// at least `min_fraction * min(width, height)` on both axes.
    pub fn validate(&self, width: u32, height: u32, min_fraction: f32) -> Result<()> {
        if !self.is_inside(width, height) {
            return Err(ScanEditError::InvalidCrop(format!(
                "margins {self:?} leave no area inside a {width}x{height} image"
            )));
        }
        let min_size = min_dimension(width, height) * min_fraction;
        let (w, h) = self.kept_size(width, height);
        if w < min_size || h < min_size {
            return Err(ScanEditError::InvalidCrop(format!(
                "kept region {w:.1}x{h:.1} is below the minimum size {min_size:.1}"
            )));
        }
        Ok(())
    }
}

/// Four document corners ordered top-left, top-right, bottom-left,
/// bottom-right. Serialises as a bare array of four points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quadrilateral {
    pub corners: [Point; 4],
}

impl Quadrilateral {
    pub const TOP_LEFT: usize = 0;
    pub const TOP_RIGHT: usize = 1;
    pub const BOTTOM_LEFT: usize = 2;
    pub const BOTTOM_RIGHT: usize = 3;

    pub const fn new(corners: [Point; 4]) -> Self {
        Self { corners }
    }

    /// Axis-aligned box of `fraction` of the image dimensions, centred.
    pub fn centered_box(width: u32, height: u32, fraction: f32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let half_w = w * fraction / 2.0;
        let half_h = h * fraction / 2.0;
        let (cx, cy) = (w / 2.0, h / 2.0);
        Self::new([
            Point::new(cx - half_w, cy - half_h),
            Point::new(cx + half_w, cy - half_h),
            Point::new(cx - half_w, cy + half_h),
            Point::new(cx + half_w, cy + half_h),
        ])
    }

    pub fn top_left(&self) -> Point {
        self.corners[Self::TOP_LEFT]
    }

    pub fn top_right(&self) -> Point {
        self.corners[Self::TOP_RIGHT]
    }

    pub fn bottom_left(&self) -> Point {
        self.corners[Self::BOTTOM_LEFT]
    }

    pub fn bottom_right(&self) -> Point {
        self.corners[Self::BOTTOM_RIGHT]
    }

    /// Corners walked around the perimeter: TL, TR, BR, BL.
    pub fn perimeter(&self) -> [Point; 4] {
        [
            self.top_left(),
            self.top_right(),
            self.bottom_right(),
            self.bottom_left(),
        ]
    }

    /// Enclosed area via the shoelace formula over the perimeter order.
    pub fn area(&self) -> f32 {
        let pts = self.perimeter();
        let mut twice = 0.0f32;
        for i in 0..pts.len() {
            let j = (i + 1) % pts.len();
            twice += pts[i].x * pts[j].y - pts[j].x * pts[i].y;
        }
        twice.abs() / 2.0
    }

    /// Smallest distance between any two corners.
    pub fn min_corner_distance(&self) -> f32 {
        let mut min = f32::INFINITY;
        for i in 0..4 {
            for j in (i + 1)..4 {
                min = min.min(self.corners[i].distance(&self.corners[j]));
            }
        }
        min
    }

    /// `(min_x, min_y, max_x, max_y)` over all corners.
    pub fn bounding_box(&self) -> (f32, f32, f32, f32) {
        self.corners.iter().fold(
            (f32::INFINITY, f32::INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
            |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        )
    }
}

/// `min(width, height)` as a float, the base for all size thresholds.
pub fn min_dimension(width: u32, height: u32) -> f32 {
    width.min(height) as f32
}

// -- Adjustments --------------------------------------------------------------

/// Colour treatment applied before brightness and contrast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Color,
    Grayscale,
    Monochrome,
}

/// Slider bounds for [`AdjustmentParams`].
pub mod adjustment_bounds {
    pub const NEUTRAL_LEVEL: u8 = 50;
    pub const MAX_LEVEL: u8 = 100;
    pub const MIN_RESOLUTION: u16 = 25;
    pub const MAX_RESOLUTION: u16 = 200;
    pub const NATIVE_RESOLUTION: u16 = 100;
}

/// Photometric and resolution parameters. Together with a source image they
/// fully determine the working image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdjustmentParams {
    pub color_mode: ColorMode,
    /// 0..=100, 50 is neutral.
    pub brightness: u8,
    /// 0..=100, 50 is neutral.
    pub contrast: u8,
    /// 25..=200, 100 is native size.
    pub resolution_percent: u16,
}

impl Default for AdjustmentParams {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl AdjustmentParams {
    pub const NEUTRAL: Self = Self {
        color_mode: ColorMode::Color,
        brightness: adjustment_bounds::NEUTRAL_LEVEL,
        contrast: adjustment_bounds::NEUTRAL_LEVEL,
        resolution_percent: adjustment_bounds::NATIVE_RESOLUTION,
    };

    pub fn new(
        color_mode: ColorMode,
        brightness: u8,
        contrast: u8,
        resolution_percent: u16,
    ) -> Result<Self> {
        Self::NEUTRAL
            .with_color_mode(color_mode)
            .with_brightness(brightness)?
            .with_contrast(contrast)?
            .with_resolution(resolution_percent)
    }

    pub fn with_color_mode(self, color_mode: ColorMode) -> Self {
        Self { color_mode, ..self }
    }

    pub fn with_brightness(self, brightness: u8) -> Result<Self> {
        check_level("brightness", brightness)?;
        Ok(Self { brightness, ..self })
    }

    pub fn with_contrast(self, contrast: u8) -> Result<Self> {
        check_level("contrast", contrast)?;
        Ok(Self { contrast, ..self })
    }

    pub fn with_resolution(self, resolution_percent: u16) -> Result<Self> {
        let range = adjustment_bounds::MIN_RESOLUTION..=adjustment_bounds::MAX_RESOLUTION;
        if !range.contains(&resolution_percent) {
            return Err(ScanEditError::InvalidParameter {
                name: "resolution_percent",
                detail: format!("{resolution_percent} is outside {range:?}"),
            });
        }
        Ok(Self {
            resolution_percent,
            ..self
        })
    }

    /// True when brightness and contrast are both neutral.
    pub fn is_tone_neutral(&self) -> bool {
        self.brightness == adjustment_bounds::NEUTRAL_LEVEL
            && self.contrast == adjustment_bounds::NEUTRAL_LEVEL
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }
}

fn check_level(name: &'static str, value: u8) -> Result<()> {
    if value > adjustment_bounds::MAX_LEVEL {
        return Err(ScanEditError::InvalidParameter {
            name,
            detail: format!("{value} is above {}", adjustment_bounds::MAX_LEVEL),
        });
    }
    Ok(())
}

// -- Rotation -----------------------------------------------------------------

/// Direction of a quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotateDirection {
    /// Clockwise.
    Cw,
    /// Counter-clockwise.
    Ccw,
}

/// Rotation in quarter turns, clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Normalise any multiple of 90 (negative allowed) into a rotation.
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        if degrees % 90 != 0 {
            return Err(ScanEditError::InvalidParameter {
                name: "rotation",
                detail: format!("{degrees} is not a multiple of 90"),
            });
        }
        Ok(match degrees.rem_euclid(360) {
            0 => Self::Deg0,
            90 => Self::Deg90,
            180 => Self::Deg180,
            _ => Self::Deg270,
        })
    }

    /// Add a quarter turn in `direction`, wrapping modulo 360.
    pub fn turned(self, direction: RotateDirection) -> Self {
        let step = match direction {
            RotateDirection::Cw => 90,
            RotateDirection::Ccw => -90,
        };
        // A multiple of 90 always normalises.
        Self::from_degrees(i32::from(self.degrees()) + step).unwrap_or_default()
    }

    /// Whether output width and height are swapped relative to the input.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

// -- Detection ----------------------------------------------------------------

/// Kind of document the capture step was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    #[default]
    Document,
    Id,
    Receipt,
}

/// Result of the external edge detector, handed over with the captured photo.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Detection {
    pub corners: Option<Quadrilateral>,
    pub detected: bool,
    #[serde(rename = "type", default)]
    pub doc_type: DocType,
}

impl Detection {
    /// No document found.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn found(corners: Quadrilateral, doc_type: DocType) -> Self {
        Self {
            corners: Some(corners),
            detected: true,
            doc_type,
        }
    }

    /// The detected corners, if the detector reported success.
    pub fn quadrilateral(&self) -> Option<Quadrilateral> {
        if self.detected { self.corners } else { None }
    }
}

// -- Encoding -----------------------------------------------------------------

/// Encoder quality on a 1..=100 scale.
///
/// Zero is rejected: JPEG quantisation is undefined at quality 0, so the
/// lowest usable factor is 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Result<Self> {
        if !(1..=100).contains(&value) {
            return Err(ScanEditError::InvalidParameter {
                name: "quality",
                detail: format!("{value} is outside 1..=100"),
            });
        }
        Ok(Self(value))
    }

    /// Clamp into `min..=100`.
    pub fn clamped(value: u8, min: u8) -> Self {
        Self(value.clamp(min.max(1), 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Quality on the 0.0..=1.0 scale browsers and most encoders use.
    pub fn as_fraction(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}

impl TryFrom<u8> for Quality {
    type Error = ScanEditError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> u8 {
        quality.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_both_ways() {
        assert_eq!(Rotation::Deg270.turned(RotateDirection::Cw), Rotation::Deg0);
        assert_eq!(Rotation::Deg0.turned(RotateDirection::Ccw), Rotation::Deg270);
        assert_eq!(Rotation::from_degrees(-450).unwrap(), Rotation::Deg270);
        assert!(Rotation::from_degrees(45).is_err());
    }

    #[test]
    fn crop_rect_validation() {
        let ok = CropRect::new(100.0, 50.0, 50.0, 100.0);
        assert!(ok.validate(1000, 1400, 0.05).is_ok());
        assert_eq!(ok.kept_size(1000, 1400), (900.0, 1200.0));

        let inverted = CropRect::new(0.0, 600.0, 500.0, 0.0);
        assert!(matches!(
            inverted.validate(1000, 1400, 0.05),
            Err(ScanEditError::InvalidCrop(_))
        ));

        // 40 px wide is below 5% of 1000.
        let sliver = CropRect::new(0.0, 480.0, 480.0, 0.0);
        assert!(sliver.validate(1000, 1400, 0.05).is_err());

        let negative = CropRect::new(-1.0, 0.0, 0.0, 0.0);
        assert!(!negative.is_inside(100, 100));
    }

    #[test]
    fn quad_area_and_distances() {
        let quad = Quadrilateral::centered_box(100, 200, 0.5);
        assert!((quad.area() - 50.0 * 100.0).abs() < 1e-3);
        assert!((quad.min_corner_distance() - 50.0).abs() < 1e-3);
        assert_eq!(quad.bounding_box(), (25.0, 50.0, 75.0, 150.0));
    }

    #[test]
    fn adjustment_params_reject_out_of_range() {
        assert!(AdjustmentParams::NEUTRAL.with_brightness(101).is_err());
        assert!(AdjustmentParams::NEUTRAL.with_resolution(24).is_err());
        assert!(AdjustmentParams::NEUTRAL.with_resolution(201).is_err());
        let params = AdjustmentParams::new(ColorMode::Grayscale, 70, 30, 150).unwrap();
        assert!(!params.is_tone_neutral());
        assert!(AdjustmentParams::default().is_neutral());
    }

    #[test]
    fn detection_json_shape() {
        let json = r#"{
            "corners": [{"x":1,"y":2},{"x":3,"y":2},{"x":1,"y":4},{"x":3,"y":4}],
            "detected": true,
            "type": "receipt"
        }"#;
        let detection: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(detection.doc_type, DocType::Receipt);
        assert!(detection.quadrilateral().is_some());

        let undetected = Detection {
            detected: false,
            ..detection
        };
        assert!(undetected.quadrilateral().is_none());

        let round_trip = serde_json::to_value(detection).unwrap();
        assert!(round_trip["corners"].is_array());

        let missing: Detection =
            serde_json::from_str(r#"{"corners": null, "detected": false, "type": "document"}"#).unwrap();
        assert!(missing.corners.is_none());
    }

    #[test]
    fn quality_bounds() {
        assert!(Quality::new(0).is_err());
        assert_eq!(Quality::new(1).unwrap().value(), 1);
        assert_eq!(Quality::new(100).unwrap().value(), 100);
        assert!(serde_json::from_str::<Quality>("0").is_err());
        assert_eq!(Quality::clamped(5, 10).value(), 10);
        assert!((Quality::new(80).unwrap().as_fraction() - 0.8).abs() < f32::EPSILON);
    }
}
