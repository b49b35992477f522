// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Error classification and plain-English messages.
//
// Maps every `VerifdocError` onto the propagation policy: module failures are
// recovered as data, render failures are fatal to one render call only, and
// empty uploads are rejected before any module runs.

use crate::error::VerifdocError;

/// Where an error sits in the propagation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Captured as `ModuleResult { success: false }`; the pipeline continues.
    Recovered,
    /// The analysis still produced a valid record, with reduced confidence.
    Degraded,
    /// Fatal to one render call; the record stays valid.
    RenderFailure,
    /// Input rejected before any work was done.
    Rejected,
    /// Filesystem, configuration, or serialization trouble around the engine.
    Environment,
}

impl ErrorClass {
    /// Whether retrying (after fixing configuration or assets) can succeed.
    pub fn retriable(&self) -> bool {
        matches!(self, Self::RenderFailure | Self::Environment)
    }
}

/// Classify an error for propagation and retry decisions.
pub fn classify_error(err: &VerifdocError) -> ErrorClass {
    match err {
        VerifdocError::ModuleFailure { .. } => ErrorClass::Recovered,
        VerifdocError::EmptyInput => ErrorClass::Rejected,
        VerifdocError::DuplicateModule(_) => ErrorClass::Environment,
        VerifdocError::Decode { .. }
        | VerifdocError::BlockTooLarge { .. }
        | VerifdocError::InvalidPageConfig(_)
        | VerifdocError::PdfError(_) => ErrorClass::RenderFailure,
        VerifdocError::Config(_) | VerifdocError::Io(_) | VerifdocError::Serialization(_) => {
            ErrorClass::Environment
        }
    }
}

/// A human-readable error with a suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub class: ErrorClass,
}

/// Convert a `VerifdocError` into text an operator can act on.
pub fn humanize_error(err: &VerifdocError) -> HumanError {
    let class = classify_error(err);
    let (message, suggestion) = match err {
        VerifdocError::EmptyInput => (
            "The uploaded document is empty.".to_owned(),
            "Upload the file again; nothing was analysed.".to_owned(),
        ),
        VerifdocError::ModuleFailure { module, reason } => (
            format!("The {module} analysis could not complete ({reason})."),
            "The verdict was computed from the remaining modules.".to_owned(),
        ),
        VerifdocError::DuplicateModule(module) => (
            format!("The {module} module was registered twice."),
            "Register each analysis module exactly once.".to_owned(),
        ),
        VerifdocError::Decode { asset, .. } => (
            format!("The image '{asset}' is not a supported picture format."),
            "Replace the asset with a PNG or JPEG file and render again.".to_owned(),
        ),
        VerifdocError::BlockTooLarge { block, .. } => (
            format!("The report section '{block}' does not fit on a single page."),
            "Use a larger page size or smaller margins, then render again.".to_owned(),
        ),
        VerifdocError::InvalidPageConfig(detail) => (
            format!("The page layout settings are unusable: {detail}."),
            "Check the page size and margin values in the configuration.".to_owned(),
        ),
        VerifdocError::PdfError(detail) => (
            format!("The PDF report could not be produced: {detail}."),
            "Try rendering again; the analysis record is unaffected.".to_owned(),
        ),
        VerifdocError::Config(detail) => (
            format!("The configuration could not be used: {detail}."),
            "Fix the configuration file or remove it to use defaults.".to_owned(),
        ),
        VerifdocError::Io(io) => (
            format!("A file could not be read or written: {io}."),
            "Check that the path exists and is accessible.".to_owned(),
        ),
        VerifdocError::Serialization(detail) => (
            format!("A record or configuration file is malformed: {detail}."),
            "Make sure the file is valid JSON produced by VerifDoc.".to_owned(),
        ),
    };
    HumanError {
        message,
        suggestion,
        class,
    }
}
