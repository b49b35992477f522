// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Analysis entry point: validate the upload, run the modules, fuse, and
// assemble the immutable report record.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use verifdoc_core::config::EngineConfig;
use verifdoc_core::error::{Result, VerifdocError};
use verifdoc_core::record::{AnalysisStatus, DocumentMetadata, ReportRecord};

use crate::cancel::CancelToken;
use crate::fusion::FusionEngine;
use crate::module::AnalysisModule;
use crate::orchestrator::Orchestrator;

/// Produces a `ReportRecord` for each uploaded document.
pub struct Analyzer {
    orchestrator: Orchestrator,
    fusion: FusionEngine,
}

impl Analyzer {
    pub fn new(orchestrator: Orchestrator, fusion: FusionEngine) -> Self {
        Self {
            orchestrator,
            fusion,
        }
    }

    /// An analyzer with no modules yet, configured from `config`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            Orchestrator::new(config.orchestrator.clone()),
            FusionEngine::new(config.fusion.clone()),
        )
    }

    pub fn register(&mut self, module: Arc<dyn AnalysisModule>) -> Result<()> {
        self.orchestrator.register(module)
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Analyse one upload, deriving its metadata from the bytes.
    pub async fn analyze_document(
        &self,
        document: impl Into<Arc<[u8]>>,
        filename: &str,
    ) -> Result<ReportRecord> {
        let document = document.into();
        let metadata = DocumentMetadata::describe(&document, filename);
        self.analyze_with(document, metadata, &CancelToken::never())
            .await
    }

    /// Analyse one upload with caller-supplied metadata and cancellation.
    ///
    /// An empty document is rejected before any module runs. A run in which
    /// every module fails still yields a valid record carrying the
    /// "insufficient data" verdict.
    #[instrument(skip_all, fields(filename = %metadata.filename, bytes = document.len()))]
    pub async fn analyze_with(
        &self,
        document: Arc<[u8]>,
        metadata: DocumentMetadata,
        cancel: &CancelToken,
    ) -> Result<ReportRecord> {
        if document.is_empty() {
            warn!("rejecting empty upload");
            return Err(VerifdocError::EmptyInput);
        }

        info!(mime = %metadata.mime_type, "analysis started");
        let results = self
            .orchestrator
            .run_all(document, &metadata.filename, cancel)
            .await;
        let fusion = self.fusion.fuse(&results);
        let record = ReportRecord::assemble(metadata, results, fusion);

        match record.status() {
            AnalysisStatus::Complete => {}
            AnalysisStatus::Partial { failed } => {
                warn!(?failed, "analysis completed without some modules");
            }
            AnalysisStatus::AllModulesFailed => {
                warn!("every analysis module failed; verdict is insufficient data");
            }
        }
        info!(
            report_id = %record.id,
            score = record.fusion.global_score,
            band = %record.fusion.risk_band,
            "analysis completed"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use verifdoc_core::types::{Explanation, ModuleId, RiskBand};

    use super::*;
    use crate::fusion::INSUFFICIENT_DATA;
    use crate::module::ModuleOutput;

    struct Fixed(ModuleId, Option<f64>);

    #[async_trait]
    impl AnalysisModule for Fixed {
        fn id(&self) -> ModuleId {
            self.0
        }

        async fn run(&self, _document: &[u8], _filename: &str) -> Result<ModuleOutput> {
            match self.1 {
                Some(score) => Ok(ModuleOutput::scored(score)
                    .with_explanation(Explanation::Compression {
                        message: "Normal compression".into(),
                    })
                    .with_heatmap(format!("{}.png", self.0))),
                None => Err(VerifdocError::module_failure(self.0, "detector offline")),
            }
        }
    }

    fn analyzer(modules: &[(ModuleId, Option<f64>)]) -> Analyzer {
        let mut analyzer = Analyzer::from_config(&EngineConfig::default());
        for (id, score) in modules {
            analyzer.register(Arc::new(Fixed(*id, *score))).unwrap();
        }
        analyzer
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let analyzer = analyzer(&[(ModuleId::Ela, Some(10.0))]);
        let err = analyzer
            .analyze_document(Vec::new(), "empty.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, VerifdocError::EmptyInput));
    }

    #[tokio::test]
    async fn partial_failure_still_produces_a_record() {
        let analyzer = analyzer(&[
            (ModuleId::Ela, None),
            (ModuleId::Noiseprint, Some(20.0)),
            (ModuleId::CopyMove, Some(60.0)),
            (ModuleId::Ocr, Some(40.0)),
        ]);
        let record = analyzer
            .analyze_document(b"%PDF-1.7".to_vec(), "invoice.pdf")
            .await
            .unwrap();

        assert_eq!(record.fusion.global_score, 40.0);
        assert_eq!(record.fusion.risk_band, RiskBand::Moderate);
        assert_eq!(record.module_results.len(), 4);
        let ela = record.module_results.get(ModuleId::Ela).unwrap();
        assert!(!ela.success);
        assert_eq!(ela.error_reason.as_deref(), Some("detector offline"));
        assert_eq!(record.mime_type, "application/pdf");
        assert_eq!(record.size, 8);
        assert!(record.integrity_hash.is_some());
    }

    #[tokio::test]
    async fn total_failure_is_degraded_not_fatal() {
        let analyzer = analyzer(&[(ModuleId::Ela, None), (ModuleId::Ocr, None)]);
        let record = analyzer
            .analyze_document(b"data".to_vec(), "photo.jpg")
            .await
            .unwrap();

        assert_eq!(record.status(), AnalysisStatus::AllModulesFailed);
        assert_eq!(record.fusion.global_score, 0.0);
        assert_eq!(record.fusion.summary, INSUFFICIENT_DATA);
        assert!(record.fusion.indicators.is_empty());
    }

    #[tokio::test]
    async fn reanalysis_produces_a_new_record() {
        let analyzer = analyzer(&[(ModuleId::Ela, Some(75.0))]);
        let first = analyzer
            .analyze_document(b"abc".to_vec(), "a.png")
            .await
            .unwrap();
        let second = analyzer
            .analyze_document(b"abc".to_vec(), "a.png")
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.fusion, second.fusion);
        assert_eq!(first.heatmaps(), vec![(ModuleId::Ela, "ela.png")]);
    }
}
