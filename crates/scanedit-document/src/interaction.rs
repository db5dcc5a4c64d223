// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Crop and perspective interaction model.
//
// Pointer positions arrive in on-screen container coordinates and are mapped
// into image pixels per axis, so a letterboxed image with a different aspect
// ratio still tracks the pointer. Every update is clamped against the crop
// rectangle and quadrilateral invariants; an update that cannot be clamped
// into a valid shape is dropped and the previous shape kept.

use scanedit_core::error::{Result, ScanEditError};
use scanedit_core::{CropRect, Point, Quadrilateral};
use tracing::{debug, trace};

use crate::scan::quad::{QuadPolicy, validate_quadrilateral};

/// Mapping between the on-screen container and the image it displays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    container_width: f32,
    container_height: f32,
    image_width: u32,
    image_height: u32,
}

impl Viewport {
    pub fn new(container_width: f32, container_height: f32, image_width: u32, image_height: u32) -> Result<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(container_width) || !valid(container_height) {
            return Err(ScanEditError::InvalidParameter {
                name: "container",
                detail: format!("{container_width}x{container_height} is not a drawable size"),
            });
        }
        Ok(Self {
            container_width,
            container_height,
            image_width,
            image_height,
        })
    }

    /// Image pixels per container unit, per axis.
    pub fn scale(&self) -> (f32, f32) {
        (
            self.image_width as f32 / self.container_width,
            self.image_height as f32 / self.container_height,
        )
    }

    /// Map a container position into image space, clamping it to the
    /// container first.
    pub fn to_image(&self, pointer: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new(
            pointer.x.clamp(0.0, self.container_width) * sx,
            pointer.y.clamp(0.0, self.container_height) * sy,
        )
    }

    /// Map a container-space movement into image pixels.
    pub fn delta_to_image(&self, dx: f32, dy: f32) -> (f32, f32) {
        let (sx, sy) = self.scale();
        (dx * sx, dy * sy)
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }
}

/// The crop handle being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropHandle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Move one crop corner to `pointer` (image space). Only that corner's two
/// margins change; each is kept non-negative and far enough from the
/// opposite margin to leave `min_size` pixels.
pub fn drag_crop_corner(
    rect: &CropRect,
    handle: CropHandle,
    pointer: Point,
    width: u32,
    height: u32,
    min_size: f32,
) -> CropRect {
    let (w, h) = (width as f32, height as f32);
    let fit = |value: f32, opposite: f32, extent: f32| value.min(extent - opposite - min_size).max(0.0);

    let mut next = *rect;
    match handle {
        CropHandle::TopLeft => {
            next.left = fit(pointer.x, rect.right, w);
            next.top = fit(pointer.y, rect.bottom, h);
        }
        CropHandle::TopRight => {
            next.right = fit(w - pointer.x, rect.left, w);
            next.top = fit(pointer.y, rect.bottom, h);
        }
        CropHandle::BottomLeft => {
            next.left = fit(pointer.x, rect.right, w);
            next.bottom = fit(h - pointer.y, rect.top, h);
        }
        CropHandle::BottomRight => {
            next.right = fit(w - pointer.x, rect.left, w);
            next.bottom = fit(h - pointer.y, rect.top, h);
        }
    }
    trace!(?handle, ?next, "crop corner dragged");
    next
}

/// Shift the whole rectangle by an image-space delta. Returns `None` when
/// the moved rectangle would leave the image.
pub fn move_crop(rect: &CropRect, dx: f32, dy: f32) -> Option<CropRect> {
    let moved = CropRect {
        top: rect.top + dy,
        left: rect.left + dx,
        right: rect.right - dx,
        bottom: rect.bottom - dy,
    };
    let inside = [moved.top, moved.left, moved.right, moved.bottom]
        .iter()
        .all(|&m| m >= 0.0);
    if inside {
        Some(moved)
    } else {
        debug!(dx, dy, "crop move rejected at image edge");
        None
    }
}

/// Move one quadrilateral corner to `pointer` (image space), clamped to the
/// image. Returns `None` if the moved shape would break `policy`, either by
/// crowding another corner or by enclosing too little area.
pub fn drag_quad_corner(
    quad: &Quadrilateral,
    index: usize,
    pointer: Point,
    width: u32,
    height: u32,
    policy: &QuadPolicy,
) -> Option<Quadrilateral> {
    if index >= quad.corners.len() {
        return None;
    }
    let mut next = *quad;
    next.corners[index] = Point::new(
        pointer.x.clamp(0.0, width as f32),
        pointer.y.clamp(0.0, height as f32),
    );
    if let Err(err) = validate_quadrilateral(&next, width, height, policy) {
        debug!(index, %err, "corner drag rejected");
        return None;
    }
    Some(next)
}

/// What a pointer gesture is manipulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    CropCorner(CropHandle),
    CropMove,
    QuadCorner(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveGesture {
    kind: GestureKind,
    last: Point,
}

/// Tracks the single active pointer gesture. A second gesture cannot start
/// until the first is released.
#[derive(Debug, Default, Clone)]
pub struct GestureTracker {
    active: Option<ActiveGesture>,
}

impl GestureTracker {
    pub fn begin(&mut self, kind: GestureKind, at: Point) -> Result<()> {
        if self.active.is_some() {
            return Err(ScanEditError::GestureInProgress);
        }
        debug!(?kind, "gesture started");
        self.active = Some(ActiveGesture { kind, last: at });
        Ok(())
    }

    /// Record pointer motion. Returns the active gesture and the previous
    /// pointer position, or `None` if no gesture is active.
    pub fn motion(&mut self, to: Point) -> Option<(GestureKind, Point)> {
        let gesture = self.active.as_mut()?;
        let from = gesture.last;
        gesture.last = to;
        Some((gesture.kind, from))
    }

    /// Release the pointer.
    pub fn end(&mut self) -> Option<GestureKind> {
        self.active.take().map(|g| g.kind)
    }

    pub fn active(&self) -> Option<GestureKind> {
        self.active.map(|g| g.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letterboxed_viewport_scales_each_axis() {
        let vp = Viewport::new(500.0, 500.0, 1000, 1400).unwrap();
        assert_eq!(vp.scale(), (2.0, 2.8));
        assert_eq!(vp.to_image(Point::new(250.0, 100.0)), Point::new(500.0, 280.0));
        // Off-container pointers are clamped first.
        assert_eq!(vp.to_image(Point::new(-10.0, 900.0)), Point::new(0.0, 1400.0));
        assert!(Viewport::new(0.0, 10.0, 10, 10).is_err());
    }

    #[test]
    fn corner_drag_changes_only_its_margins() {
        let rect = CropRect::uniform(100.0);
        let next = drag_crop_corner(&rect, CropHandle::BottomRight, Point::new(800.0, 1100.0), 1000, 1400, 50.0);
        assert_eq!(next, CropRect::new(100.0, 100.0, 200.0, 300.0));
    }

    #[test]
    fn corner_drag_respects_minimum_size_and_bounds() {
        let rect = CropRect::uniform(100.0);
        // Drag the top-left handle past the bottom-right one.
        let next = drag_crop_corner(&rect, CropHandle::TopLeft, Point::new(990.0, 1390.0), 1000, 1400, 50.0);
        assert_eq!(next.left, 1000.0 - 100.0 - 50.0);
        assert_eq!(next.top, 1400.0 - 100.0 - 50.0);
        assert!(next.validate(1000, 1400, 0.05).is_ok());

        let out = drag_crop_corner(&rect, CropHandle::TopRight, Point::new(1200.0, -5.0), 1000, 1400, 50.0);
        assert_eq!(out.right, 0.0);
        assert_eq!(out.top, 0.0);
    }

    #[test]
    fn move_shifts_all_margins_or_nothing() {
        let rect = CropRect::new(100.0, 50.0, 50.0, 100.0);
        let moved = move_crop(&rect, 20.0, -30.0).unwrap();
        assert_eq!(moved, CropRect::new(70.0, 70.0, 30.0, 130.0));
        // Kept size is unchanged by a move.
        assert_eq!(moved.kept_size(1000, 1400), rect.kept_size(1000, 1400));
        assert!(move_crop(&rect, 60.0, 0.0).is_none());
        assert!(move_crop(&rect, 0.0, -101.0).is_none());
    }

    #[test]
    fn quad_corner_is_clamped_and_kept_apart() {
        let policy = QuadPolicy::default();
        let quad = Quadrilateral::centered_box(1000, 1000, 0.7);
        let moved = drag_quad_corner(&quad, Quadrilateral::TOP_LEFT, Point::new(-50.0, 20.0), 1000, 1000, &policy).unwrap();
        assert_eq!(moved.top_left(), Point::new(0.0, 20.0));

        let near_tr = Point::new(quad.top_right().x - 10.0, quad.top_right().y);
        assert!(drag_quad_corner(&quad, Quadrilateral::TOP_LEFT, near_tr, 1000, 1000, &policy).is_none());
        assert!(drag_quad_corner(&quad, 7, Point::new(1.0, 1.0), 1000, 1000, &policy).is_none());
    }

    #[test]
    fn quad_corner_drag_keeps_minimum_area() {
        let policy = QuadPolicy::default();
        let quad = Quadrilateral::centered_box(1000, 1000, 0.7);
        // Pulling the bottom-right corner to (300, 300) leaves ~105000px of a
        // required 200000px.
        assert!(drag_quad_corner(&quad, Quadrilateral::BOTTOM_RIGHT, Point::new(300.0, 300.0), 1000, 1000, &policy).is_none());
        assert!(drag_quad_corner(&quad, Quadrilateral::BOTTOM_RIGHT, Point::new(700.0, 700.0), 1000, 1000, &policy).is_some());
    }

    #[test]
    fn only_one_gesture_at_a_time() {
        let mut tracker = GestureTracker::default();
        tracker.begin(GestureKind::CropMove, Point::new(10.0, 10.0)).unwrap();
        assert!(matches!(
            tracker.begin(GestureKind::QuadCorner(0), Point::new(0.0, 0.0)),
            Err(ScanEditError::GestureInProgress)
        ));
        assert_eq!(tracker.motion(Point::new(15.0, 12.0)), Some((GestureKind::CropMove, Point::new(10.0, 10.0))));
        assert_eq!(tracker.motion(Point::new(16.0, 12.0)), Some((GestureKind::CropMove, Point::new(15.0, 12.0))));
        assert_eq!(tracker.end(), Some(GestureKind::CropMove));
        assert!(tracker.motion(Point::new(0.0, 0.0)).is_none());
        assert!(tracker.begin(GestureKind::QuadCorner(1), Point::new(0.0, 0.0)).is_ok());
    }
}
