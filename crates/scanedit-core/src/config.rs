// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::types::Quality;

/// Lowest export quality the settings screen offers.
pub const MIN_EXPORT_QUALITY: u8 = 10;

/// Persistent editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Encoder quality for on-screen previews.
    pub preview_quality: u8,
    /// Encoder quality for committed edits; also the reference when reporting
    /// how much export compression saved.
    pub commit_quality: u8,
    /// Encoder quality for the exported artifact (10-100).
    pub export_quality: u8,
    /// When false, export uses `commit_quality` instead of `export_quality`.
    pub compression_enabled: bool,
    /// Run text recognition during export.
    pub ocr_enabled: bool,
    /// Minimum crop side, as a fraction of `min(width, height)`.
    pub min_crop_fraction: f32,
    /// Minimum distance between quadrilateral corners, as a fraction of
    /// `min(width, height)`.
    pub min_corner_fraction: f32,
    /// Minimum quadrilateral area, as a fraction of the image area.
    pub min_quad_area_fraction: f32,
    /// Scan resolution shown on the settings screen.
    pub dpi: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            preview_quality: 80,
            commit_quality: 95,
            export_quality: 80,
            compression_enabled: true,
            ocr_enabled: false,
            min_crop_fraction: 0.05,
            min_corner_fraction: 0.10,
            min_quad_area_fraction: 0.20,
            dpi: 300,
        }
    }
}

impl ScanConfig {
    /// Load settings from a JSON file. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        info!(path = %path.display(), "config loaded");
        Ok(config.sanitized())
    }

    /// Write settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Clamp every field into the range the editor supports.
    pub fn sanitized(self) -> Self {
        Self {
            preview_quality: self.preview_quality.clamp(1, 100),
            commit_quality: self.commit_quality.clamp(1, 100),
            export_quality: self.export_quality.clamp(MIN_EXPORT_QUALITY, 100),
            min_crop_fraction: self.min_crop_fraction.clamp(0.01, 0.5),
            min_corner_fraction: self.min_corner_fraction.clamp(0.0, 0.5),
            min_quad_area_fraction: self.min_quad_area_fraction.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn preview_quality(&self) -> Quality {
        Quality::clamped(self.preview_quality, 1)
    }

    pub fn commit_quality(&self) -> Quality {
        Quality::clamped(self.commit_quality, 1)
    }

    /// Quality the export stage encodes with.
    pub fn effective_export_quality(&self) -> Quality {
        if self.compression_enabled {
            Quality::clamped(self.export_quality, MIN_EXPORT_QUALITY)
        } else {
            self.commit_quality()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScanConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ScanConfig::default());
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = ScanConfig {
            export_quality: 55,
            ocr_enabled: true,
            ..ScanConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(ScanConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_defaults_and_clamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"export_quality": 3}"#).unwrap();
        let config = ScanConfig::load(&path).unwrap();
        assert_eq!(config.export_quality, MIN_EXPORT_QUALITY);
        assert_eq!(config.commit_quality, 95);
    }

    #[test]
    fn compression_toggle_selects_quality() {
        let mut config = ScanConfig::default();
        assert_eq!(config.effective_export_quality().value(), 80);
        config.compression_enabled = false;
        assert_eq!(config.effective_export_quality().value(), 95);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(ScanConfig::load(&path).is_err());
    }
}
