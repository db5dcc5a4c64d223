// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan-side helpers — detection and recognition seams, quadrilateral
// validation with fallbacks, and the luminance auto-crop heuristic.

pub mod autocrop;
pub mod detect;
pub mod ocr;
pub mod quad;

pub use autocrop::estimate_crop;
pub use detect::{DocumentDetector, NoDetector, SuppliedDetection};
pub use ocr::{NoRecognizer, StaticRecognizer, TextRecognizer};
pub use quad::{QuadPolicy, SeedSource};

#[cfg(feature = "ocr")]
pub use ocr::{OcrConfig, OcrEngine};
