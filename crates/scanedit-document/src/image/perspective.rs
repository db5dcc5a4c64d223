// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective warp — map a document quadrilateral onto an upright rectangle.

use image::Rgba;
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use scanedit_core::Quadrilateral;
use scanedit_core::error::{Result, ScanEditError};
use tracing::{info, instrument, warn};

use crate::raster::RasterImage;

/// Fill for destination pixels whose source falls outside the photo.
const OUTSIDE_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Size of the rectangle a quadrilateral is flattened into.
///
/// Width is the longer of the top and bottom edges, height the longer of the
/// left and right edges, so no side of the document is downsampled. Each
/// side is capped at `max_side`.
pub fn target_dimensions(quad: &Quadrilateral, max_side: f32) -> (u32, u32) {
    let top = quad.top_left().distance(&quad.top_right());
    let bottom = quad.bottom_left().distance(&quad.bottom_right());
    let left = quad.top_left().distance(&quad.bottom_left());
    let right = quad.top_right().distance(&quad.bottom_right());
    let side = |len: f32| (len.min(max_side).round() as u32).max(1);
    (side(top.max(bottom)), side(left.max(right)))
}

/// Warp the region enclosed by `quad` into an upright rectangle.
///
/// Builds the homography sending the four corners to the corners of a
/// `target_dimensions` rectangle and resamples bilinearly. Fails with
/// `InvalidQuadrilateral` if the corners are degenerate (collinear or
/// coincident) and no projection exists.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn warp_to_rectangle(image: &RasterImage, quad: &Quadrilateral) -> Result<RasterImage> {
    if quad.area() < 1.0 {
        return Err(ScanEditError::InvalidQuadrilateral(format!(
            "corners enclose no area: {quad:?}"
        )));
    }
    // No edge inside the photo can be longer than its diagonal.
    let diagonal = (image.width() as f32).hypot(image.height() as f32).ceil();
    let (out_w, out_h) = target_dimensions(quad, diagonal);

    let src = [
        quad.top_left(),
        quad.top_right(),
        quad.bottom_right(),
        quad.bottom_left(),
    ]
    .map(|p| (p.x, p.y));
    let dest = [
        (0.0, 0.0),
        (out_w as f32, 0.0),
        (out_w as f32, out_h as f32),
        (0.0, out_h as f32),
    ];

    let projection = Projection::from_control_points(src, dest).ok_or_else(|| {
        warn!(?quad, "no projective transform for corners");
        ScanEditError::InvalidQuadrilateral("corners do not span a quadrilateral".into())
    })?;

    let mut output = image::RgbaImage::new(out_w, out_h);
    warp_into(
        image.buffer(),
        &projection,
        Interpolation::Bilinear,
        OUTSIDE_FILL,
        &mut output,
    );

    info!(out_w, out_h, "perspective warp applied");
    Ok(RasterImage::from_buffer(output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanedit_core::Point;

    #[test]
    fn target_uses_longest_edges() {
        let quad = Quadrilateral::new([
            Point::new(10.0, 10.0),
            Point::new(110.0, 20.0),
            Point::new(0.0, 210.0),
            Point::new(120.0, 200.0),
        ]);
        let (w, h) = target_dimensions(&quad, f32::INFINITY);
        assert_eq!(w, 120);
        assert_eq!(h, 200);
        assert_eq!(target_dimensions(&quad, 150.0), (120, 150));
    }

    #[test]
    fn far_out_corners_are_capped_at_the_diagonal() {
        let img = RasterImage::filled(30, 40, [0, 0, 0, 255]).unwrap();
        let quad = Quadrilateral::new([
            Point::new(0.0, 0.0),
            Point::new(1e6, 0.0),
            Point::new(0.0, 1e6),
            Point::new(1e6, 1e6),
        ]);
        let out = warp_to_rectangle(&img, &quad).unwrap();
        assert_eq!(out.dimensions(), (50, 50));
    }

    #[test]
    fn axis_aligned_quad_behaves_like_crop() {
        // Left half black, right half white.
        let img = RasterImage::from_fn(100, 80, |x, _| if x < 50 { [0, 0, 0, 255] } else { [255; 4] }).unwrap();
        let quad = Quadrilateral::new([
            Point::new(20.0, 10.0),
            Point::new(80.0, 10.0),
            Point::new(20.0, 70.0),
            Point::new(80.0, 70.0),
        ]);
        let out = warp_to_rectangle(&img, &quad).unwrap();
        assert_eq!(out.dimensions(), (60, 60));
        assert_eq!(out.pixel(5, 30), Some([0, 0, 0, 255]));
        assert_eq!(out.pixel(55, 30), Some([255, 255, 255, 255]));
    }

    #[test]
    fn skewed_document_is_flattened() {
        // A bright trapezoid on a dark background; after warping, the interior
        // of the output should be bright everywhere.
        let quad = Quadrilateral::new([
            Point::new(40.0, 20.0),
            Point::new(160.0, 30.0),
            Point::new(20.0, 180.0),
            Point::new(180.0, 170.0),
        ]);
        let inside = |x: f32, y: f32| {
            let pts = quad.perimeter();
            (0..4).all(|i| {
                let a = pts[i];
                let b = pts[(i + 1) % 4];
                (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x) >= 0.0
            })
        };
        let img = RasterImage::from_fn(200, 200, |x, y| {
            if inside(x as f32 + 0.5, y as f32 + 0.5) { [230, 230, 230, 255] } else { [10, 10, 10, 255] }
        })
        .unwrap();
        let out = warp_to_rectangle(&img, &quad).unwrap();
        let (w, h) = out.dimensions();
        for (x, y) in [(w / 2, h / 2), (w / 4, h / 4), (3 * w / 4, 3 * h / 4)] {
            let px = out.pixel(x, y).unwrap();
            assert!(px[0] > 200, "pixel ({x},{y}) = {px:?}");
        }
    }

    #[test]
    fn collinear_corners_are_rejected() {
        let img = RasterImage::filled(50, 50, [0; 4]).unwrap();
        let quad = Quadrilateral::new([
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(20.0, 20.0),
            Point::new(30.0, 30.0),
        ]);
        assert!(matches!(
            warp_to_rectangle(&img, &quad),
            Err(ScanEditError::InvalidQuadrilateral(_))
        ));
    }
}
