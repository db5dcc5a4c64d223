// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image operators — photometric (colour mode, brightness, contrast), geometric
// (crop, rotate, scale) and perspective warping. All operators are pure: they
// borrow a `RasterImage` and return a new one.

pub mod geometric;
pub mod perspective;
pub mod photometric;

pub use geometric::{crop, rotate, scale};
pub use perspective::warp_to_rectangle;
pub use photometric::apply_photometric;
