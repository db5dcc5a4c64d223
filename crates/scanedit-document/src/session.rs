// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edit session — the single owner of everything one photo's editing needs:
// transform pipeline, history, pending crop/rotation/corners, the active
// gesture and the collaborators used at export time.

use std::sync::Arc;

use scanedit_core::error::{Result, ScanEditError};
use scanedit_core::{
    AdjustmentParams, ColorMode, CropRect, Detection, Point, Quadrilateral, RotateDirection,
    Rotation, ScanConfig, min_dimension,
};
use tracing::{debug, info, instrument, warn};

use crate::export::{ExportArtifact, export_image};
use crate::history::{EditHistory, HistoryEntry};
use crate::image::rotate;
use crate::interaction::{
    GestureKind, GestureTracker, Viewport, drag_crop_corner, drag_quad_corner, move_crop,
};
use crate::pipeline::{PipelineState, TransformPipeline, render_dimensions};
use crate::preview::PublishedPreview;
use crate::raster::RasterImage;
use crate::scan::autocrop::estimate_crop;
use crate::scan::detect::DocumentDetector;
use crate::scan::ocr::{NoRecognizer, TextRecognizer};
use crate::scan::quad::{
    QuadPolicy, SeedSource, initial_crop, seed_crop, seed_perspective, validate_quadrilateral,
};

pub struct EditSession {
    config: ScanConfig,
    detection: Detection,
    pipeline: TransformPipeline,
    history: EditHistory,
    crop: CropRect,
    seeded_crop: CropRect,
    corners: Quadrilateral,
    corner_source: SeedSource,
    rotation: Rotation,
    gestures: GestureTracker,
    container: Option<(f32, f32)>,
    recognizer: Arc<dyn TextRecognizer>,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("original", self.pipeline.original())
            .field("params", &self.pipeline.params())
            .field("history_index", &self.history.index())
            .field("crop", &self.crop)
            .field("rotation", &self.rotation)
            .finish_non_exhaustive()
    }
}

impl EditSession {
    // -- Loading --------------------------------------------------------------

    /// Decode a captured photo and start a session on it.
    pub fn load(bytes: &[u8], detection: Detection, config: ScanConfig) -> Result<Self> {
        let image = RasterImage::decode(bytes)?;
        Ok(Self::from_image(image, detection, config))
    }

    /// Decode a captured photo, run `detector` on it and start a session.
    pub fn load_with_detector(
        bytes: &[u8],
        detector: &dyn DocumentDetector,
        config: ScanConfig,
    ) -> Result<Self> {
        let image = RasterImage::decode(bytes)?;
        let detection = detector.detect(&image);
        debug!(detected = detection.detected, doc_type = ?detection.doc_type, "detector ran");
        Ok(Self::from_image(image, detection, config))
    }

    /// Start a session on an already decoded photo. History is seeded with
    /// the as-loaded state; crop and perspective corners are seeded from
    /// `detection` when it is trustworthy.
    #[instrument(skip(image, config), fields(width = image.width(), height = image.height()))]
    pub fn from_image(image: RasterImage, detection: Detection, config: ScanConfig) -> Self {
        let config = config.sanitized();
        let (width, height) = image.dimensions();
        let policy = QuadPolicy::from(&config);

        let crop = if detection.detected {
            seed_crop(&detection, width, height, &policy).0
        } else {
            initial_crop(width, height)
        };
        let (corners, corner_source) = seed_perspective(&detection, width, height, &policy);
        info!(?corner_source, "session started");

        let image = Arc::new(image);
        Self {
            config,
            detection,
            pipeline: TransformPipeline::new(Arc::clone(&image)),
            history: EditHistory::seeded(HistoryEntry::neutral(image)),
            crop,
            seeded_crop: crop,
            corners,
            corner_source,
            rotation: Rotation::Deg0,
            gestures: GestureTracker::default(),
            container: None,
            recognizer: Arc::new(NoRecognizer),
        }
    }

    /// Use `recognizer` for text extraction and export.
    pub fn with_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    // -- Accessors ------------------------------------------------------------

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn detection(&self) -> &Detection {
        &self.detection
    }

    pub fn params(&self) -> AdjustmentParams {
        self.pipeline.params()
    }

    /// Baseline every preview is computed from.
    pub fn original(&self) -> &Arc<RasterImage> {
        self.pipeline.original()
    }

    pub fn working(&self) -> &Arc<RasterImage> {
        self.pipeline.working()
    }

    pub fn state(&self) -> PipelineState {
        self.pipeline.state()
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }

    pub fn crop(&self) -> CropRect {
        self.crop
    }

    pub fn corners(&self) -> Quadrilateral {
        self.corners
    }

    pub fn corner_source(&self) -> SeedSource {
        self.corner_source
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn policy(&self) -> QuadPolicy {
        QuadPolicy::from(&self.config)
    }

    fn min_crop_size(&self) -> f32 {
        let (w, h) = self.original().dimensions();
        min_dimension(w, h) * self.config.min_crop_fraction
    }

    // -- Adjustments ----------------------------------------------------------

    pub fn set_params(&mut self, params: AdjustmentParams) {
        self.pipeline.set_params(params);
    }

    pub fn set_brightness(&mut self, brightness: u8) -> Result<()> {
        let params = self.params().with_brightness(brightness)?;
        self.set_params(params);
        Ok(())
    }

    pub fn set_contrast(&mut self, contrast: u8) -> Result<()> {
        let params = self.params().with_contrast(contrast)?;
        self.set_params(params);
        Ok(())
    }

    pub fn set_color_mode(&mut self, color_mode: ColorMode) {
        let params = self.params().with_color_mode(color_mode);
        self.set_params(params);
    }

    pub fn set_resolution(&mut self, resolution_percent: u16) -> Result<()> {
        let params = self.params().with_resolution(resolution_percent)?;
        self.set_params(params);
        Ok(())
    }

    /// Record adjustments to be rendered in the background and return the
    /// baseline the render needs.
    pub fn stage_params(&mut self, params: AdjustmentParams) -> (Arc<RasterImage>, AdjustmentParams) {
        self.pipeline.stage_params(params);
        (Arc::clone(self.original()), params)
    }

    /// Show a background render. Ignored if the parameters have moved on or
    /// the render came from a baseline other than the current one.
    pub fn adopt_preview(&mut self, preview: &PublishedPreview) -> bool {
        let expected = render_dimensions(self.original(), &preview.params);
        if preview.params != self.params()
            || !Arc::ptr_eq(&preview.source, self.original())
            || preview.image.dimensions() != expected
        {
            debug!(generation = preview.ticket.generation(), "preview no longer matches session");
            return false;
        }
        self.pipeline.adopt_preview(preview.params, Arc::clone(&preview.image));
        true
    }

    /// Working image encoded at preview quality.
    pub fn preview_bytes(&self) -> Result<Vec<u8>> {
        self.pipeline.preview_bytes(self.config.preview_quality())
    }

    /// Fold the current adjustments and working image into history.
    pub fn commit_adjustments(&mut self) {
        self.history.commit(self.pipeline.snapshot());
        self.pipeline.mark_committed();
    }

    // -- History --------------------------------------------------------------

    /// Step back one history entry. Returns false at the start of history.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.undo().cloned() else {
            return false;
        };
        self.restore_entry(&entry);
        true
    }

    /// Step forward one history entry. Returns false at the end of history.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.redo().cloned() else {
            return false;
        };
        self.restore_entry(&entry);
        true
    }

    /// Commit a new entry holding the very first loaded image with neutral
    /// adjustments. Earlier entries stay reachable through undo.
    #[instrument(skip(self))]
    pub fn restore_original(&mut self) {
        let first = Arc::clone(&self.history.first().baseline);
        let entry = HistoryEntry::neutral(first);
        self.history.commit(entry.clone());
        self.restore_entry(&entry);
        info!("original restored");
    }

    fn restore_entry(&mut self, entry: &HistoryEntry) {
        let dims_changed = entry.baseline.dimensions() != self.original().dimensions();
        self.pipeline.restore(entry);
        if dims_changed {
            self.reseed_geometry();
        }
    }

    /// Pending crop, corners and rotation refer to the baseline; start them
    /// afresh whenever the baseline changes shape.
    fn reseed_geometry(&mut self) {
        let (w, h) = self.original().dimensions();
        self.crop = initial_crop(w, h);
        self.seeded_crop = self.crop;
        let (corners, source) = seed_perspective(&Detection::none(), w, h, &self.policy());
        self.corners = corners;
        self.corner_source = source;
        self.rotation = Rotation::Deg0;
    }

    // -- Crop -----------------------------------------------------------------

    /// Replace the pending crop after checking it against the baseline.
    pub fn set_crop(&mut self, rect: CropRect) -> Result<()> {
        let (w, h) = self.original().dimensions();
        rect.validate(w, h, self.config.min_crop_fraction)?;
        self.crop = rect;
        Ok(())
    }

    /// Go back to the crop the session was seeded with.
    pub fn restore_crop(&mut self) {
        self.crop = self.seeded_crop;
    }

    /// Seed the pending crop from border luminance.
    pub fn auto_crop(&mut self) -> Result<()> {
        let rect = estimate_crop(self.original());
        self.set_crop(rect)
    }

    /// Render the pending crop with current adjustments.
    pub fn preview_crop(&self) -> Result<RasterImage> {
        self.pipeline.preview_crop(&self.crop)
    }

    /// Commit the pending crop. On failure nothing changes.
    pub fn apply_crop(&mut self) -> Result<()> {
        let entry = self.pipeline.apply_crop(&self.crop, self.config.min_crop_fraction)?;
        self.history.commit(entry);
        self.reseed_geometry();
        Ok(())
    }

    // -- Rotation -------------------------------------------------------------

    /// Add a pending quarter turn.
    pub fn rotate(&mut self, direction: RotateDirection) {
        self.rotation = self.rotation.turned(direction);
        debug!(degrees = self.rotation.degrees(), "pending rotation");
    }

    /// Working image with the pending rotation applied, for display.
    pub fn preview_rotation(&self) -> RasterImage {
        rotate(self.working(), self.rotation)
    }

    /// Commit the pending rotation. A zero rotation commits nothing.
    pub fn apply_rotation(&mut self) -> Result<()> {
        if self.rotation == Rotation::Deg0 {
            return Ok(());
        }
        let entry = self.pipeline.apply_rotation(self.rotation)?;
        self.history.commit(entry);
        self.reseed_geometry();
        Ok(())
    }

    // -- Perspective ----------------------------------------------------------

    /// Replace the perspective corners after validating them.
    pub fn set_corners(&mut self, quad: Quadrilateral) -> Result<()> {
        let (w, h) = self.original().dimensions();
        validate_quadrilateral(&quad, w, h, &self.policy())?;
        self.corners = quad;
        self.corner_source = SeedSource::Detected;
        Ok(())
    }

    /// Warp the corners' region into an upright rectangle and commit it.
    pub fn apply_perspective(&mut self) -> Result<()> {
        let (w, h) = self.original().dimensions();
        validate_quadrilateral(&self.corners, w, h, &self.policy())?;
        let entry = self.pipeline.apply_perspective(&self.corners)?;
        self.history.commit(entry);
        self.reseed_geometry();
        Ok(())
    }

    // -- Gestures -------------------------------------------------------------

    /// Size of the on-screen container the baseline is drawn into.
    pub fn set_container(&mut self, width: f32, height: f32) -> Result<()> {
        let (w, h) = self.original().dimensions();
        Viewport::new(width, height, w, h)?;
        self.container = Some((width, height));
        Ok(())
    }

    fn viewport(&self) -> Result<Viewport> {
        let (cw, ch) = self.container.ok_or_else(|| ScanEditError::InvalidParameter {
            name: "container",
            detail: "no container size set".into(),
        })?;
        let (w, h) = self.original().dimensions();
        Viewport::new(cw, ch, w, h)
    }

    /// Press on a handle at a container position.
    pub fn begin_gesture(&mut self, kind: GestureKind, at: Point) -> Result<()> {
        self.viewport()?;
        self.gestures.begin(kind, at)
    }

    /// Pointer moved to a container position. Returns whether the crop or
    /// corners changed.
    pub fn drag_to(&mut self, to: Point) -> Result<bool> {
        let viewport = self.viewport()?;
        let Some((kind, from)) = self.gestures.motion(to) else {
            return Ok(false);
        };
        let (w, h) = viewport.image_size();

        match kind {
            GestureKind::CropCorner(handle) => {
                let pointer = viewport.to_image(to);
                self.crop = drag_crop_corner(&self.crop, handle, pointer, w, h, self.min_crop_size());
                Ok(true)
            }
            GestureKind::CropMove => {
                let (dx, dy) = viewport.delta_to_image(to.x - from.x, to.y - from.y);
                match move_crop(&self.crop, dx, dy) {
                    Some(rect) => {
                        self.crop = rect;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
            GestureKind::QuadCorner(index) => {
                let pointer = viewport.to_image(to);
                match drag_quad_corner(&self.corners, index, pointer, w, h, &self.policy()) {
                    Some(quad) => {
                        self.corners = quad;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
        }
    }

    /// Release the pointer.
    pub fn end_gesture(&mut self) -> Option<GestureKind> {
        self.gestures.end()
    }

    // -- Output ---------------------------------------------------------------

    /// Recognise text on the working image.
    pub fn extract_text(&self) -> Result<String> {
        self.recognizer.recognize(self.working()).inspect_err(|err| {
            warn!(%err, "text extraction failed");
        })
    }

    /// Encode the working image for persistence.
    pub fn export(&self) -> Result<ExportArtifact> {
        export_image(self.working(), &self.config, self.recognizer.as_ref())
    }
}
