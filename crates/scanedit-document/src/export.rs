// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export stage — final JPEG encoding, compression report, integrity hash and
// optional text recognition. Persistence of the bytes is the caller's job.

use chrono::{DateTime, Utc};
use scanedit_core::error::Result;
use scanedit_core::{ArtifactId, Quality, ScanConfig};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use crate::raster::RasterImage;
use crate::scan::ocr::TextRecognizer;

/// Metadata describing an exported image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    pub id: ArtifactId,
    pub created_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    pub size_bytes: usize,
    /// Size of the same image at commit quality.
    pub reference_size_bytes: usize,
    /// Percentage saved relative to `reference_size_bytes`. Negative when
    /// export quality is above commit quality.
    pub compression_ratio: f32,
    /// Hex SHA-256 of the exported bytes.
    pub sha256: String,
    pub text: Option<String>,
    /// Why text is missing when recognition was requested.
    pub ocr_notice: Option<String>,
}

/// Encoded bytes plus their report.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub report: ExportReport,
}

/// Hex-encoded SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// `(1 - size / reference) * 100`; zero for an empty reference.
pub fn compression_ratio(size: usize, reference: usize) -> f32 {
    if reference == 0 {
        return 0.0;
    }
    ((1.0 - size as f64 / reference as f64) * 100.0) as f32
}

/// Encode `image` for export and, if enabled, recognise its text.
///
/// Recognition failures never fail the export; they are recorded in
/// `ocr_notice` and logged.
#[instrument(skip_all, fields(width = image.width(), height = image.height()))]
pub fn export_image(
    image: &RasterImage,
    config: &ScanConfig,
    recognizer: &dyn TextRecognizer,
) -> Result<ExportArtifact> {
    let quality = config.effective_export_quality();
    let reference_quality = config.commit_quality();

    let bytes = image.encode_jpeg(quality)?;
    let reference_size = if quality == reference_quality {
        bytes.len()
    } else {
        image.encode_jpeg(reference_quality)?.len()
    };
    let ratio = compression_ratio(bytes.len(), reference_size);

    let (text, ocr_notice) = if config.ocr_enabled {
        match recognizer.recognize(image) {
            Ok(text) => (Some(text), None),
            Err(err) => {
                warn!(%err, "text recognition failed, exporting without text");
                (None, Some(err.to_string()))
            }
        }
    } else {
        (None, None)
    };

    let report = ExportReport {
        id: ArtifactId::new(),
        created_at: Utc::now(),
        width: image.width(),
        height: image.height(),
        quality,
        size_bytes: bytes.len(),
        reference_size_bytes: reference_size,
        compression_ratio: ratio,
        sha256: sha256_hex(&bytes),
        text,
        ocr_notice,
    };
    info!(
        id = %report.id,
        quality = quality.value(),
        size = report.size_bytes,
        ratio = report.compression_ratio,
        "image exported"
    );
    Ok(ExportArtifact { bytes, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::ocr::{NoRecognizer, StaticRecognizer};

    fn page() -> RasterImage {
        RasterImage::from_fn(64, 48, |x, y| {
            let v = ((x * 31 + y * 17) % 256) as u8;
            [v, v.wrapping_mul(3), 255 - v, 255]
        })
        .unwrap()
    }

    #[test]
    fn known_digest() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn ratio_is_relative_to_reference() {
        assert_eq!(compression_ratio(25, 100), 75.0);
        assert_eq!(compression_ratio(100, 100), 0.0);
        assert_eq!(compression_ratio(10, 0), 0.0);
    }

    #[test]
    fn lower_quality_reports_savings() {
        let config = ScanConfig {
            export_quality: 20,
            ..ScanConfig::default()
        };
        let artifact = export_image(&page(), &config, &NoRecognizer).unwrap();
        let report = &artifact.report;
        assert_eq!(report.quality.value(), 20);
        assert!(report.size_bytes < report.reference_size_bytes);
        assert!(report.compression_ratio > 0.0);
        assert_eq!(report.sha256, sha256_hex(&artifact.bytes));
        assert!(RasterImage::decode(&artifact.bytes).is_ok());
    }

    #[test]
    fn disabled_compression_uses_commit_quality() {
        let config = ScanConfig {
            compression_enabled: false,
            ..ScanConfig::default()
        };
        let report = export_image(&page(), &config, &NoRecognizer).unwrap().report;
        assert_eq!(report.quality.value(), 95);
        assert_eq!(report.compression_ratio, 0.0);
    }

    #[test]
    fn ocr_failure_does_not_block_export() {
        let config = ScanConfig {
            ocr_enabled: true,
            ..ScanConfig::default()
        };
        let failing = StaticRecognizer(Err("model crashed".into()));
        let report = export_image(&page(), &config, &failing).unwrap().report;
        assert!(report.text.is_none());
        assert!(report.ocr_notice.unwrap().contains("model crashed"));

        let report = export_image(&page(), &config, &NoRecognizer).unwrap().report;
        assert!(report.ocr_notice.is_some());
    }

    #[test]
    fn recognised_text_is_attached() {
        let config = ScanConfig {
            ocr_enabled: true,
            ..ScanConfig::default()
        };
        let ocr = StaticRecognizer(Ok("INVOICE 42".into()));
        let report = export_image(&page(), &config, &ocr).unwrap().report;
        assert_eq!(report.text.as_deref(), Some("INVOICE 42"));
        assert!(report.ocr_notice.is_none());
    }

    #[test]
    fn ocr_is_skipped_when_disabled() {
        let ocr = StaticRecognizer(Ok("ignored".into()));
        let report = export_image(&page(), &ScanConfig::default(), &ocr).unwrap().report;
        assert!(report.text.is_none() && report.ocr_notice.is_none());
    }
}
