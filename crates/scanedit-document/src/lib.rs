// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanedit-document — Image editing for scanned documents.
//
// Provides the raster buffer and its operators (colour mode, brightness,
// contrast, crop, rotate, scale, perspective warp), the transform pipeline
// and linear edit history, the crop/perspective interaction model, background
// previews, the export stage, and the `EditSession` that ties them together.

pub mod export;
pub mod history;
pub mod image;
pub mod interaction;
pub mod pipeline;
pub mod preview;
pub mod raster;
pub mod scan;
pub mod script;
pub mod session;

// Re-export the primary types so callers can use `scanedit_document::EditSession` etc.
pub use export::{ExportArtifact, ExportReport};
pub use history::{EditHistory, HistoryEntry};
pub use interaction::{CropHandle, GestureKind};
pub use pipeline::{PipelineState, TransformPipeline};
pub use preview::PreviewScheduler;
pub use raster::RasterImage;
pub use scan::{DocumentDetector, NoRecognizer, TextRecognizer};
pub use script::{EditScript, EditStep};
pub use session::EditSession;

#[cfg(feature = "ocr")]
pub use scan::OcrEngine;
