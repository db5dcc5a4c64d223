// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the editing screens.
//
// Every technical error is mapped to plain language with a clear suggestion.
// Severity drives whether the UI shows a blocking message or a passing notice.

use crate::error::ScanEditError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Worth retrying as-is.
    Transient,
    /// User must change something (crop handles, corners, settings).
    ActionRequired,
    /// Cannot be fixed by retrying, e.g. a damaged file or unsupported format.
    Permanent,
    /// Informational only; the pipeline carries on without the feature.
    Notice,
}

/// A human-readable error with plain message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Short summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether repeating the same action may succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `ScanEditError` into a message fit for a toast or dialog.
pub fn humanize_error(err: &ScanEditError) -> HumanError {
    match err {
        ScanEditError::Decode(_) => HumanError {
            message: "We couldn't open this photo.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try taking the photo again or choose a JPEG or PNG.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        ScanEditError::Encode(_) => HumanError {
            message: "We couldn't save the edited image.".into(),
            suggestion: "Try again. If this keeps happening, lower the resolution and export again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanEditError::InvalidCrop(_) => HumanError {
            message: "The crop area is invalid.".into(),
            suggestion: "Drag the corners apart so the selected area covers part of the document, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanEditError::InvalidQuadrilateral(_) => HumanError {
            message: "The document corners don't look right.".into(),
            suggestion: "Move each corner onto a corner of the page, keeping them well apart, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanEditError::InvalidParameter { name, .. } => HumanError {
            message: "That setting is out of range.".into(),
            suggestion: format!("Move the {name} control back into its normal range."),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanEditError::GestureInProgress => HumanError {
            message: "Finish the current adjustment first.".into(),
            suggestion: "Release the handle you are dragging, then start the next one.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        ScanEditError::UnsupportedCapability(feature) => HumanError {
            message: "This feature isn't available here.".into(),
            suggestion: format!("You can carry on without it. ({feature})"),
            retriable: false,
            severity: Severity::Notice,
        },

        ScanEditError::Ocr(_) => HumanError {
            message: "Text recognition didn't work on this scan.".into(),
            suggestion: "The image was still saved. Try again with better lighting and the text in focus.".into(),
            retriable: true,
            severity: Severity::Notice,
        },

        ScanEditError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to use that file.".into(),
                    suggestion: "Check the file permissions, or copy the file somewhere else first.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ScanEditError::Serialization(_) => HumanError {
            message: "Saved settings couldn't be read.".into(),
            suggestion: "Defaults will be used. Change the settings again to save them.".into(),
            retriable: false,
            severity: Severity::Notice,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_crop_needs_user_action() {
        let human = humanize_error(&ScanEditError::InvalidCrop("empty".into()));
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn ocr_failure_is_only_a_notice() {
        let human = humanize_error(&ScanEditError::Ocr("model missing".into()));
        assert_eq!(human.severity, Severity::Notice);
        assert!(human.retriable);
    }

    #[test]
    fn missing_capability_is_a_notice() {
        let human = humanize_error(&ScanEditError::UnsupportedCapability("ocr".into()));
        assert_eq!(human.severity, Severity::Notice);
        assert!(human.suggestion.contains("ocr"));
    }

    #[test]
    fn decode_failure_is_permanent() {
        let human = humanize_error(&ScanEditError::Decode("truncated".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }

    #[test]
    fn missing_file_is_action_required() {
        let err = ScanEditError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(humanize_error(&err).severity, Severity::ActionRequired);
    }
}
