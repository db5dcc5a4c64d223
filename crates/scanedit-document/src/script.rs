// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edit scripts — a JSON list of editor actions replayed against a session.

use std::path::Path;

use scanedit_core::error::Result;
use scanedit_core::human_errors::humanize_error;
use scanedit_core::{ColorMode, CropRect, Point, Quadrilateral, RotateDirection};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::session::EditSession;

/// One user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditStep {
    SetBrightness { value: u8 },
    SetContrast { value: u8 },
    SetColorMode { mode: ColorMode },
    SetResolution { percent: u16 },
    SetCrop(CropRect),
    RestoreCrop,
    AutoCrop,
    ApplyCrop,
    Rotate { direction: RotateDirection },
    ApplyRotation,
    SetCorners { corners: [Point; 4] },
    ApplyPerspective,
    Commit,
    Undo,
    Redo,
    RestoreOriginal,
}

impl EditStep {
    /// Perform the step. Undo and redo at the ends of history are no-ops.
    pub fn apply(&self, session: &mut EditSession) -> Result<()> {
        match self {
            Self::SetBrightness { value } => session.set_brightness(*value)?,
            Self::SetContrast { value } => session.set_contrast(*value)?,
            Self::SetColorMode { mode } => session.set_color_mode(*mode),
            Self::SetResolution { percent } => session.set_resolution(*percent)?,
            Self::SetCrop(rect) => session.set_crop(*rect)?,
            Self::RestoreCrop => session.restore_crop(),
            Self::AutoCrop => session.auto_crop()?,
            Self::ApplyCrop => session.apply_crop()?,
            Self::Rotate { direction } => session.rotate(*direction),
            Self::ApplyRotation => session.apply_rotation()?,
            Self::SetCorners { corners } => session.set_corners(Quadrilateral::new(*corners))?,
            Self::ApplyPerspective => session.apply_perspective()?,
            Self::Commit => session.commit_adjustments(),
            Self::Undo => {
                session.undo();
            }
            Self::Redo => {
                session.redo();
            }
            Self::RestoreOriginal => session.restore_original(),
        }
        Ok(())
    }
}

/// A step that failed during replay.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedStep {
    pub index: usize,
    pub step: EditStep,
    pub reason: String,
    /// What the user can do about it.
    pub suggestion: String,
}

/// What a replay did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    pub applied: usize,
    pub rejected: Vec<RejectedStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditScript {
    pub steps: Vec<EditStep>,
}

impl EditScript {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&data)
    }

    /// Apply every step in order. A failing step is recorded and skipped;
    /// the session keeps the state from before that step.
    pub fn replay(&self, session: &mut EditSession) -> ReplayReport {
        let mut report = ReplayReport::default();
        for (index, step) in self.steps.iter().enumerate() {
            match step.apply(session) {
                Ok(()) => report.applied += 1,
                Err(err) => {
                    warn!(index, ?step, %err, "edit step rejected");
                    report.rejected.push(RejectedStep {
                        index,
                        step: step.clone(),
                        reason: err.to_string(),
                        suggestion: humanize_error(&err).suggestion,
                    });
                }
            }
        }
        info!(applied = report.applied, rejected = report.rejected.len(), "edit script replayed");
        report
    }
}
