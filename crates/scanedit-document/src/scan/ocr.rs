// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text recognition seam.
//
// The editor only triggers recognition and stores the resulting string, so
// the engine sits behind the `TextRecognizer` trait. With the `ocr` feature
// enabled, `OcrEngine` implements it using the pure-Rust `ocrs` engine backed
// by `rten` models. Without it, `NoRecognizer` reports the capability as
// unavailable and export carries on without text.
//
// # Model Setup
//
// The engine needs `text-detection.rten` and `text-recognition.rten`. Running
// `ocrs-cli` once downloads them to `$XDG_CACHE_HOME/ocrs` (typically
// `~/.cache/ocrs`), which is where `OcrConfig::default()` looks.

use scanedit_core::error::{Result, ScanEditError};

use crate::raster::RasterImage;

/// Anything that can turn a page image into plain text.
pub trait TextRecognizer: Send + Sync {
    /// Extract all text, lines separated by `\n`.
    fn recognize(&self, image: &RasterImage) -> Result<String>;
}

/// Recognizer used when no OCR engine is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRecognizer;

impl TextRecognizer for NoRecognizer {
    fn recognize(&self, _image: &RasterImage) -> Result<String> {
        Err(ScanEditError::UnsupportedCapability(
            "text recognition is not built into this binary".into(),
        ))
    }
}

/// Fixed-output recognizer, handy for wiring and tests.
#[derive(Debug, Clone)]
pub struct StaticRecognizer(pub std::result::Result<String, String>);

impl TextRecognizer for StaticRecognizer {
    fn recognize(&self, _image: &RasterImage) -> Result<String> {
        self.0.clone().map_err(ScanEditError::Ocr)
    }
}

#[cfg(feature = "ocr")]
pub use engine::{OcrConfig, OcrEngine};

#[cfg(feature = "ocr")]
mod engine {
    use std::path::{Path, PathBuf};

    use image::RgbImage;
    use image::buffer::ConvertBuffer;
    use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams};
    use rten::Model;
    use scanedit_core::error::{Result, ScanEditError};
    use tracing::{debug, info, instrument};

    use super::TextRecognizer;
    use crate::raster::RasterImage;

    const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
    const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

    /// `$XDG_CACHE_HOME/ocrs`, else `~/.cache/ocrs`.
    fn default_model_dir() -> PathBuf {
        if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
            PathBuf::from(xdg).join("ocrs")
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".cache").join("ocrs")
        } else {
            PathBuf::from("ocrs-models")
        }
    }

    /// Locations of the two model files.
    #[derive(Debug, Clone)]
    pub struct OcrConfig {
        pub detection_model_path: PathBuf,
        pub recognition_model_path: PathBuf,
    }

    impl Default for OcrConfig {
        fn default() -> Self {
            Self::from_dir(default_model_dir())
        }
    }

    impl OcrConfig {
        /// Expect both models inside `dir`.
        pub fn from_dir(dir: impl AsRef<Path>) -> Self {
            let dir = dir.as_ref();
            Self {
                detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
                recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
            }
        }

        fn validate(&self) -> Result<()> {
            for path in [&self.detection_model_path, &self.recognition_model_path] {
                if !path.exists() {
                    return Err(ScanEditError::UnsupportedCapability(format!(
                        "OCR model not found at {}; run `ocrs-cli` once to download models",
                        path.display()
                    )));
                }
            }
            Ok(())
        }
    }

    /// `ocrs`-backed recognizer. Model loading is the expensive step, so
    /// build one engine and reuse it for every export.
    pub struct OcrEngine {
        engine: OcrsEngine,
    }

    impl OcrEngine {
        #[instrument(skip_all, fields(
            detection = %config.detection_model_path.display(),
            recognition = %config.recognition_model_path.display(),
        ))]
        pub fn new(config: OcrConfig) -> Result<Self> {
            config.validate()?;

            let load = |path: &Path| {
                Model::load_file(path).map_err(|err| {
                    ScanEditError::Ocr(format!("failed to load model {}: {err}", path.display()))
                })
            };
            info!("loading OCR models");
            let detection_model = load(config.detection_model_path.as_path())?;
            let recognition_model = load(config.recognition_model_path.as_path())?;

            let engine = OcrsEngine::new(OcrEngineParams {
                detection_model: Some(detection_model),
                recognition_model: Some(recognition_model),
                ..Default::default()
            })
            .map_err(|err| ScanEditError::Ocr(format!("failed to initialise OCR engine: {err}")))?;

            info!("OCR engine ready");
            Ok(Self { engine })
        }

        pub fn with_defaults() -> Result<Self> {
            Self::new(OcrConfig::default())
        }
    }

    impl std::fmt::Debug for OcrEngine {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("OcrEngine").finish_non_exhaustive()
        }
    }

    impl TextRecognizer for OcrEngine {
        #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
        fn recognize(&self, image: &RasterImage) -> Result<String> {
            let rgb: RgbImage = image.buffer().convert();
            let (width, height) = rgb.dimensions();

            let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|err| {
                ScanEditError::Ocr(format!("failed to create image source ({width}x{height}): {err}"))
            })?;
            let input = self
                .engine
                .prepare_input(source)
                .map_err(|err| ScanEditError::Ocr(format!("preprocessing failed: {err}")))?;
            let text = self
                .engine
                .get_text(&input)
                .map_err(|err| ScanEditError::Ocr(format!("recognition failed: {err}")))?;

            debug!(lines = text.lines().count(), chars = text.len(), "OCR complete");
            Ok(text)
        }
    }

}
