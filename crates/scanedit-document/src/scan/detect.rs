// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document boundary detection seam. Edge detection itself lives outside the
// editor; whatever does it hands back a `Detection`.

use scanedit_core::Detection;

use crate::raster::RasterImage;

/// Produces a candidate document outline for a photo.
pub trait DocumentDetector: Send + Sync {
    fn detect(&self, image: &RasterImage) -> Detection;
}

/// Detector that never finds anything; seeding then uses the fallbacks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDetector;

impl DocumentDetector for NoDetector {
    fn detect(&self, _image: &RasterImage) -> Detection {
        Detection::none()
    }
}

/// Replays a detection computed elsewhere, e.g. by the capture screen.
#[derive(Debug, Clone, Copy)]
pub struct SuppliedDetection(pub Detection);

impl DocumentDetector for SuppliedDetection {
    fn detect(&self, _image: &RasterImage) -> Detection {
        self.0
    }
}
