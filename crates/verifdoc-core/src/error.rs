// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for VerifDoc.

use thiserror::Error;

use crate::types::ModuleId;

/// Top-level error type for all VerifDoc operations.
#[derive(Debug, Error)]
pub enum VerifdocError {
    // -- Analysis errors --
    #[error("uploaded document is empty")]
    EmptyInput,

    #[error("module {module} failed: {reason}")]
    ModuleFailure { module: ModuleId, reason: String },

    #[error("module {0} is registered more than once")]
    DuplicateModule(ModuleId),

    // -- Rendering errors --
    #[error("asset {asset} could not be decoded: {reason}")]
    Decode { asset: String, reason: String },

    #[error("block '{block}' needs {required:.2}pt but a page only holds {available:.2}pt")]
    BlockTooLarge {
        block: String,
        required: f32,
        available: f32,
    },

    #[error("invalid page configuration: {0}")]
    InvalidPageConfig(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VerifdocError {
    /// Shorthand used by module implementations to report a failed run.
    pub fn module_failure(module: ModuleId, reason: impl Into<String>) -> Self {
        Self::ModuleFailure {
            module,
            reason: reason.into(),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VerifdocError>;
