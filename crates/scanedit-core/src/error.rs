// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanedit.

use thiserror::Error;

/// Top-level error type for all Scanedit operations.
#[derive(Debug, Error)]
pub enum ScanEditError {
    // -- Image errors --
    #[error("image could not be decoded: {0}")]
    Decode(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    // -- Geometry errors --
    #[error("invalid crop: {0}")]
    InvalidCrop(String),

    #[error("invalid quadrilateral: {0}")]
    InvalidQuadrilateral(String),

    #[error("invalid parameter {name}: {detail}")]
    InvalidParameter { name: &'static str, detail: String },

    // -- Interaction --
    #[error("another gesture is already in progress")]
    GestureInProgress,

    // -- Collaborators --
    #[error("capability unavailable: {0}")]
    UnsupportedCapability(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanEditError>;
