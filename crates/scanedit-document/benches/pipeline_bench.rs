// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the scanedit-document transform pipeline.
// Measures a full preview recompute and a perspective warp on a synthetic
// page photo.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use scanedit_core::{AdjustmentParams, ColorMode, Quadrilateral};
use scanedit_document::RasterImage;
use scanedit_document::image::warp_to_rectangle;
use scanedit_document::pipeline::render;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// 800x1100 photo: dark desk with a light page from (80, 100) to (720, 1000).
fn page_photo() -> RasterImage {
    RasterImage::from_fn(800, 1100, |x, y| {
        if (80..720).contains(&x) && (100..1000).contains(&y) {
            let ink = if (x / 8 + y / 12) % 7 == 0 { 40 } else { 235 };
            [ink, ink, ink, 255]
        } else {
            [35, 30, 28, 255]
        }
    })
    .expect("fixture dimensions are non-zero")
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Every slider move restarts from the baseline, so this is the cost the
/// user feels while dragging.
fn bench_preview_recompute(c: &mut Criterion) {
    let photo = page_photo();
    let params = AdjustmentParams::new(ColorMode::Grayscale, 65, 70, 75).expect("params in range");

    c.bench_function("preview_recompute (800x1100)", |b| {
        b.iter(|| black_box(render(black_box(&photo), black_box(&params))));
    });
}

fn bench_perspective_warp(c: &mut Criterion) {
    let photo = page_photo();
    let quad = Quadrilateral::centered_box(800, 1100, 0.8);

    c.bench_function("perspective_warp (800x1100)", |b| {
        b.iter(|| black_box(warp_to_rectangle(black_box(&photo), black_box(&quad))));
    });
}

criterion_group!(benches, bench_preview_recompute, bench_perspective_warp);
criterion_main!(benches);
