// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor service — loads settings, opens a photo into an `EditSession`,
// replays an edit script and writes the exported artifact.
//
// Decoding, replay and encoding are CPU-bound, so they run on tokio's
// blocking pool while file I/O stays async.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use scanedit_core::error::{Result, ScanEditError};
use scanedit_core::{Detection, ScanConfig};
use scanedit_document::scan::detect::{DocumentDetector, NoDetector, SuppliedDetection};
use scanedit_document::scan::ocr::{NoRecognizer, TextRecognizer};
use scanedit_document::script::ReplayReport;
use scanedit_document::{EditScript, EditSession, ExportReport};
use tracing::{info, warn};

use super::data_dir;

/// What one run should do.
#[derive(Debug, Clone)]
pub struct EditJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub script: Option<PathBuf>,
    pub detection: Option<PathBuf>,
}

/// Result of one run.
#[derive(Debug)]
pub struct EditOutcome {
    pub replay: ReplayReport,
    pub report: ExportReport,
}

pub struct EditorService {
    config: ScanConfig,
    recognizer: Arc<dyn TextRecognizer>,
}

impl EditorService {
    /// Load settings and prepare the text recognizer. Call once at startup.
    pub fn init() -> Result<Self> {
        let path = data_dir::config_path();
        info!(path = %path.display(), "loading settings");
        let config = ScanConfig::load(&path)?;
        let recognizer = if config.ocr_enabled {
            build_recognizer()
        } else {
            Arc::new(NoRecognizer) as Arc<dyn TextRecognizer>
        };
        Ok(Self { config, recognizer })
    }

    /// Open, edit and export one photo.
    pub async fn run(&self, job: &EditJob) -> Result<EditOutcome> {
        let bytes = tokio::fs::read(&job.input).await?;
        let detector: Box<dyn DocumentDetector> = match &job.detection {
            Some(path) => {
                let detection = serde_json::from_slice::<Detection>(&tokio::fs::read(path).await?)?;
                Box::new(SuppliedDetection(detection))
            }
            None => Box::new(NoDetector),
        };
        let script = match &job.script {
            Some(path) => EditScript::from_json(&tokio::fs::read_to_string(path).await?)?,
            None => EditScript::default(),
        };

        let config = self.config.clone();
        let recognizer = Arc::clone(&self.recognizer);
        let (replay, artifact) = tokio::task::spawn_blocking(move || -> Result<_> {
            let mut session = EditSession::load_with_detector(&bytes, detector.as_ref(), config)?
                .with_recognizer(recognizer);
            let replay = script.replay(&mut session);
            let artifact = session.export()?;
            Ok((replay, artifact))
        })
        .await
        .map_err(|err| ScanEditError::Io(std::io::Error::other(err)))??;

        write_outputs(&job.output, &artifact.bytes, &artifact.report).await?;
        Ok(EditOutcome {
            replay,
            report: artifact.report,
        })
    }
}

/// Write the image, its JSON report and, when present, the recognised text
/// next to it.
async fn write_outputs(output: &Path, bytes: &[u8], report: &ExportReport) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(output, bytes).await?;
    tokio::fs::write(output.with_extension("json"), serde_json::to_vec_pretty(report)?).await?;
    if let Some(text) = &report.text {
        tokio::fs::write(output.with_extension("txt"), text).await?;
    }
    info!(path = %output.display(), size = bytes.len(), "artifact written");
    Ok(())
}

#[cfg(feature = "ocr")]
fn build_recognizer() -> Arc<dyn TextRecognizer> {
    match scanedit_document::OcrEngine::with_defaults() {
        Ok(engine) => Arc::new(engine),
        Err(err) => {
            warn!(%err, "OCR unavailable, exporting without text");
            Arc::new(NoRecognizer)
        }
    }
}

#[cfg(not(feature = "ocr"))]
fn build_recognizer() -> Arc<dyn TextRecognizer> {
    warn!("built without the `ocr` feature, exporting without text");
    Arc::new(NoRecognizer)
}
