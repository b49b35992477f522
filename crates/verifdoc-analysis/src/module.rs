// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability interface implemented by forensic analysis modules.
//
// Detectors (ELA, noise fingerprinting, copy-move, OCR, ...) live outside
// this crate. The orchestrator only ever sees them through `AnalysisModule`.

use async_trait::async_trait;
use verifdoc_core::error::Result;
use verifdoc_core::types::{Explanation, ModuleId, ModuleResult};

/// What a module produces when its run succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleOutput {
    /// Forgery likelihood in `0.0..=100.0`.
    pub score: f64,
    pub explanation: Option<Explanation>,
    /// Reference to a heatmap image the module stored for the report.
    pub heatmap: Option<String>,
}

impl ModuleOutput {
    pub fn scored(score: f64) -> Self {
        Self {
            score,
            explanation: None,
            heatmap: None,
        }
    }

    pub fn with_explanation(mut self, explanation: Explanation) -> Self {
        self.explanation = Some(explanation);
        self
    }

    pub fn with_heatmap(mut self, asset_ref: impl Into<String>) -> Self {
        self.heatmap = Some(asset_ref.into());
        self
    }

    /// Convert into a recorded result. A score outside `0..=100` (or NaN)
    /// downgrades the run to a failure so it never reaches fusion.
    pub fn into_result(self, module: ModuleId) -> ModuleResult {
        if !(self.score.is_finite() && (0.0..=100.0).contains(&self.score)) {
            return ModuleResult::failure(module, format!("score out of range: {}", self.score));
        }
        ModuleResult {
            module,
            success: true,
            score: Some(self.score),
            explanation: self.explanation,
            heatmap: self.heatmap,
            error_reason: None,
        }
    }
}

/// A forensic analysis capability.
///
/// Implementations must not block the async runtime; CPU-heavy detectors
/// should move their work onto `tokio::task::spawn_blocking`. The document
/// bytes are shared read-only between all modules of a run.
#[async_trait]
pub trait AnalysisModule: Send + Sync {
    /// Which module this is. Must be unique within an orchestrator.
    fn id(&self) -> ModuleId;

    /// Analyse one document.
    async fn run(&self, document: &[u8], filename: &str) -> Result<ModuleOutput>;
}
