// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transform pipeline — keeps the baseline ("original") image and rebuilds the
// working image from it in full whenever the adjustments change. Geometric
// edits replace the baseline atomically.

use std::sync::Arc;

use scanedit_core::error::Result;
use scanedit_core::{AdjustmentParams, CropRect, Quadrilateral, Quality, Rotation};
use tracing::{info, instrument, warn};

use crate::history::HistoryEntry;
use crate::image::geometric::scaled_dimensions;
use crate::image::{apply_photometric, crop, rotate, scale, warp_to_rectangle};
use crate::raster::RasterImage;

/// Where the pipeline is in its render/commit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineState {
    /// Working image equals what the last commit or restore produced.
    #[default]
    Idle,
    /// Adjustments changed since the last commit.
    Previewing,
    /// A geometric edit is being computed.
    Committing,
}

/// Full recompute: colour mode, brightness/contrast, then resolution.
pub fn render(original: &RasterImage, params: &AdjustmentParams) -> RasterImage {
    let toned = apply_photometric(original, params);
    scale(&toned, params.resolution_percent)
}

/// Size of the image `render` produces.
pub fn render_dimensions(original: &RasterImage, params: &AdjustmentParams) -> (u32, u32) {
    scaled_dimensions(original.width(), original.height(), params.resolution_percent)
}

#[derive(Debug, Clone)]
pub struct TransformPipeline {
    original: Arc<RasterImage>,
    working: Arc<RasterImage>,
    params: AdjustmentParams,
    state: PipelineState,
}

impl TransformPipeline {
    /// Start from a freshly loaded image with neutral adjustments.
    pub fn new(original: Arc<RasterImage>) -> Self {
        Self {
            working: Arc::clone(&original),
            original,
            params: AdjustmentParams::NEUTRAL,
            state: PipelineState::Idle,
        }
    }

    pub fn original(&self) -> &Arc<RasterImage> {
        &self.original
    }

    pub fn working(&self) -> &Arc<RasterImage> {
        &self.working
    }

    pub fn params(&self) -> AdjustmentParams {
        self.params
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Replace the adjustments and rebuild the working image from the
    /// baseline.
    #[instrument(skip(self))]
    pub fn set_params(&mut self, params: AdjustmentParams) {
        self.state = PipelineState::Previewing;
        self.params = params;
        self.working = if params.is_neutral() {
            Arc::clone(&self.original)
        } else {
            Arc::new(render(&self.original, &params))
        };
    }

    /// Record new adjustments without rendering. The working image is
    /// replaced once a matching render is adopted.
    pub fn stage_params(&mut self, params: AdjustmentParams) {
        self.state = PipelineState::Previewing;
        self.params = params;
    }

    /// Install a working image rendered elsewhere (for instance by the
    /// preview scheduler) for `params`.
    pub fn adopt_preview(&mut self, params: AdjustmentParams, working: Arc<RasterImage>) {
        self.state = PipelineState::Previewing;
        self.params = params;
        self.working = working;
    }

    /// Render a pending crop with the current adjustments, committing
    /// nothing.
    pub fn preview_crop(&self, rect: &CropRect) -> Result<RasterImage> {
        let cropped = crop(&self.original, rect)?;
        Ok(render(&cropped, &self.params))
    }

    /// Crop the baseline. `rect` must also clear the minimum kept size.
    pub fn apply_crop(&mut self, rect: &CropRect, min_fraction: f32) -> Result<HistoryEntry> {
        let (width, height) = self.original.dimensions();
        self.commit_geometric("crop", |image| {
            rect.validate(width, height, min_fraction)?;
            crop(image, rect)
        })
    }

    pub fn apply_rotation(&mut self, rotation: Rotation) -> Result<HistoryEntry> {
        self.commit_geometric("rotate", |image| Ok(rotate(image, rotation)))
    }

    pub fn apply_perspective(&mut self, quad: &Quadrilateral) -> Result<HistoryEntry> {
        self.commit_geometric("perspective", |image| warp_to_rectangle(image, quad))
    }

    /// Run a geometric operator against the baseline. On success the result
    /// becomes the new baseline and adjustments reset to neutral; on failure
    /// nothing changes.
    #[instrument(skip(self, op), fields(width = self.original.width(), height = self.original.height()))]
    fn commit_geometric(
        &mut self,
        kind: &'static str,
        op: impl FnOnce(&RasterImage) -> Result<RasterImage>,
    ) -> Result<HistoryEntry> {
        let previous = self.state;
        self.state = PipelineState::Committing;

        let result = match op(&self.original) {
            Ok(image) => Arc::new(image),
            Err(err) => {
                warn!(kind, %err, "geometric edit rejected");
                self.state = previous;
                return Err(err);
            }
        };

        info!(kind, width = result.width(), height = result.height(), "baseline replaced");
        self.original = Arc::clone(&result);
        self.working = result;
        self.params = AdjustmentParams::NEUTRAL;
        self.state = PipelineState::Idle;
        Ok(self.snapshot())
    }

    /// The current state as a history entry.
    pub fn snapshot(&self) -> HistoryEntry {
        HistoryEntry {
            result: Arc::clone(&self.working),
            baseline: Arc::clone(&self.original),
            params: self.params,
        }
    }

    /// Mark the current working image as committed.
    pub fn mark_committed(&mut self) {
        self.state = PipelineState::Idle;
    }

    /// Return to a history entry's baseline, working image and parameters.
    pub fn restore(&mut self, entry: &HistoryEntry) {
        self.original = Arc::clone(&entry.baseline);
        self.working = Arc::clone(&entry.result);
        self.params = entry.params;
        self.state = PipelineState::Idle;
    }

    /// Encode the working image for display.
    pub fn preview_bytes(&self, quality: Quality) -> Result<Vec<u8>> {
        self.working.encode_jpeg(quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanedit_core::ColorMode;
    use scanedit_core::error::ScanEditError;

    fn photo() -> Arc<RasterImage> {
        Arc::new(
            RasterImage::from_fn(40, 30, |x, y| [(x * 6) as u8, (y * 8) as u8, 120, 255]).unwrap(),
        )
    }

    #[test]
    fn previews_never_drift_from_the_baseline() {
        let mut pipeline = TransformPipeline::new(photo());
        let bright = AdjustmentParams::NEUTRAL.with_brightness(90).unwrap();
        let once = {
            pipeline.set_params(bright);
            pipeline.working().as_ref().clone()
        };
        for level in [10, 80, 30, 90] {
            pipeline.set_params(AdjustmentParams::NEUTRAL.with_brightness(level).unwrap());
        }
        assert_eq!(pipeline.working().as_ref(), &once);
        assert_eq!(pipeline.state(), PipelineState::Previewing);
    }

    #[test]
    fn neutral_params_reuse_the_baseline() {
        let mut pipeline = TransformPipeline::new(photo());
        pipeline.set_params(AdjustmentParams::NEUTRAL.with_color_mode(ColorMode::Grayscale));
        pipeline.set_params(AdjustmentParams::NEUTRAL);
        assert!(Arc::ptr_eq(pipeline.working(), pipeline.original()));
    }

    #[test]
    fn resolution_is_applied_after_tone() {
        let mut pipeline = TransformPipeline::new(photo());
        pipeline.set_params(AdjustmentParams::NEUTRAL.with_resolution(50).unwrap());
        assert_eq!(pipeline.working().dimensions(), (20, 15));
        assert_eq!(pipeline.original().dimensions(), (40, 30));
    }

    #[test]
    fn crop_commit_replaces_baseline_and_resets_params() {
        let mut pipeline = TransformPipeline::new(photo());
        pipeline.set_params(AdjustmentParams::NEUTRAL.with_contrast(80).unwrap());
        let entry = pipeline.apply_crop(&CropRect::new(5.0, 4.0, 6.0, 5.0), 0.05).unwrap();
        assert_eq!(pipeline.original().dimensions(), (30, 20));
        assert!(pipeline.params().is_neutral());
        assert_eq!(pipeline.state(), PipelineState::Idle);
        assert!(Arc::ptr_eq(&entry.baseline, pipeline.original()));
    }

    #[test]
    fn failed_commit_leaves_everything_untouched() {
        let mut pipeline = TransformPipeline::new(photo());
        let params = AdjustmentParams::NEUTRAL.with_brightness(70).unwrap();
        pipeline.set_params(params);
        let before = pipeline.working().clone();

        let err = pipeline.apply_crop(&CropRect::new(0.0, 25.0, 25.0, 0.0), 0.05).unwrap_err();
        assert!(matches!(err, ScanEditError::InvalidCrop(_)));
        assert_eq!(pipeline.original().dimensions(), (40, 30));
        assert_eq!(pipeline.params(), params);
        assert!(Arc::ptr_eq(pipeline.working(), &before));
        assert_eq!(pipeline.state(), PipelineState::Previewing);
    }

    #[test]
    fn crop_below_minimum_size_is_rejected() {
        let mut pipeline = TransformPipeline::new(photo());
        // Kept width 1px; minimum is 0.05 * 30 = 1.5px.
        let rect = CropRect::new(0.0, 20.0, 19.0, 0.0);
        assert!(pipeline.apply_crop(&rect, 0.05).is_err());
    }

    #[test]
    fn preview_crop_commits_nothing() {
        let mut pipeline = TransformPipeline::new(photo());
        pipeline.set_params(AdjustmentParams::NEUTRAL.with_color_mode(ColorMode::Monochrome));
        let preview = pipeline.preview_crop(&CropRect::uniform(5.0)).unwrap();
        assert_eq!(preview.dimensions(), (30, 20));
        assert_eq!(pipeline.original().dimensions(), (40, 30));
        assert!(pipeline.preview_crop(&CropRect::new(0.0, 20.0, 20.0, 0.0)).is_err());
    }

    #[test]
    fn restore_brings_back_baseline_and_params() {
        let mut pipeline = TransformPipeline::new(photo());
        let seed = pipeline.snapshot();
        pipeline.apply_rotation(Rotation::Deg90).unwrap();
        assert_eq!(pipeline.original().dimensions(), (30, 40));
        pipeline.restore(&seed);
        assert_eq!(pipeline.original().dimensions(), (40, 30));
        assert!(pipeline.params().is_neutral());
    }
}
