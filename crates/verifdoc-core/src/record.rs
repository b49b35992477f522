// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The report record: the immutable hand-off between analysis and rendering,
// and the unit a report store persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::human_errors::ErrorClass;
use crate::integrity::hash_bytes;
use crate::types::{Explanation, FusionResult, ModuleId, ModuleResults, OcrExcerpt};

/// Unique identifier for an analysis report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub Uuid);

impl ReportId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Digital signature details found on the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub signer: String,
    pub signed_at: Option<DateTime<Utc>>,
    pub valid: bool,
    pub algorithm: Option<String>,
}

/// An object embedded inside the document (attachment, script, font, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedObjectInfo {
    pub name: String,
    pub kind: String,
    pub size: u64,
}

/// Facts about the uploaded document, supplied alongside the module results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub integrity_hash: Option<String>,
    pub signature_info: Option<SignatureInfo>,
    pub embedded_objects_info: Option<Vec<EmbeddedObjectInfo>>,
}

impl DocumentMetadata {
    /// Describe an upload: size, MIME type, SHA-256 fingerprint, and the
    /// current time as the upload timestamp.
    pub fn describe(document: &[u8], filename: &str) -> Self {
        Self {
            filename: filename.to_owned(),
            size: document.len() as u64,
            mime_type: detect_mime_type(document, filename).to_owned(),
            uploaded_at: Utc::now(),
            integrity_hash: Some(hash_bytes(document)),
            signature_info: None,
            embedded_objects_info: None,
        }
    }

    pub fn with_uploaded_at(mut self, uploaded_at: DateTime<Utc>) -> Self {
        self.uploaded_at = uploaded_at;
        self
    }

    pub fn with_signature(mut self, signature: SignatureInfo) -> Self {
        self.signature_info = Some(signature);
        self
    }

    pub fn with_embedded_objects(mut self, objects: Vec<EmbeddedObjectInfo>) -> Self {
        self.embedded_objects_info = Some(objects);
        self
    }
}

/// Infer a MIME type from the file extension, then from magic bytes.
pub fn detect_mime_type(document: &[u8], filename: &str) -> &'static str {
    let by_extension = filename
        .rsplit_once('.')
        .and_then(|(_, ext)| match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some("application/pdf"),
            "jpg" | "jpeg" => Some("image/jpeg"),
            "png" => Some("image/png"),
            "tif" | "tiff" => Some("image/tiff"),
            "webp" => Some("image/webp"),
            "txt" => Some("text/plain"),
            _ => None,
        });
    if let Some(mime) = by_extension {
        return mime;
    }

    if document.starts_with(b"%PDF") {
        "application/pdf"
    } else if document.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if document.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if document.starts_with(b"II*\0") || document.starts_with(b"MM\0*") {
        "image/tiff"
    } else {
        "application/octet-stream"
    }
}

/// Overall outcome of the module batch behind a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisStatus {
    /// Every module produced a usable score.
    Complete,
    /// Some modules failed; the verdict rests on the rest.
    Partial { failed: Vec<ModuleId> },
    /// No module produced a score. The record is valid but carries the
    /// "insufficient data" verdict.
    AllModulesFailed,
}

impl AnalysisStatus {
    /// How the failures behind this status were handled, if there were any.
    pub fn error_class(&self) -> Option<ErrorClass> {
        match self {
            Self::Complete => None,
            Self::Partial { .. } => Some(ErrorClass::Recovered),
            Self::AllModulesFailed => Some(ErrorClass::Degraded),
        }
    }
}

/// The complete, immutable result of one analysis.
///
/// A re-analysis produces a new record with a new id; records are never
/// updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: ReportId,
    pub filename: String,
    pub size: u64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub module_results: ModuleResults,
    pub fusion: FusionResult,
    pub integrity_hash: Option<String>,
    pub signature_info: Option<SignatureInfo>,
    pub embedded_objects_info: Option<Vec<EmbeddedObjectInfo>>,
}

impl ReportRecord {
    /// Combine metadata, module results, and the fused verdict under a fresh id.
    pub fn assemble(
        metadata: DocumentMetadata,
        module_results: ModuleResults,
        fusion: FusionResult,
    ) -> Self {
        Self {
            id: ReportId::new(),
            filename: metadata.filename,
            size: metadata.size,
            mime_type: metadata.mime_type,
            uploaded_at: metadata.uploaded_at,
            module_results,
            fusion,
            integrity_hash: metadata.integrity_hash,
            signature_info: metadata.signature_info,
            embedded_objects_info: metadata.embedded_objects_info,
        }
    }

    pub fn status(&self) -> AnalysisStatus {
        let failed = self.module_results.failed_modules();
        if self.module_results.successes().next().is_none() {
            AnalysisStatus::AllModulesFailed
        } else if failed.is_empty() {
            AnalysisStatus::Complete
        } else {
            AnalysisStatus::Partial { failed }
        }
    }

    /// The OCR module's text evidence, when it ran successfully.
    pub fn ocr_excerpt(&self) -> Option<&OcrExcerpt> {
        self.module_results
            .iter()
            .filter(|r| r.success)
            .find_map(|r| match &r.explanation {
                Some(Explanation::Text(excerpt)) => Some(excerpt),
                _ => None,
            })
    }

    /// Heatmap references in module order.
    pub fn heatmaps(&self) -> Vec<(ModuleId, &str)> {
        self.module_results
            .iter()
            .filter_map(|r| r.heatmap.as_deref().map(|h| (r.module, h)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ModuleResult, RiskBand};

    fn fusion() -> FusionResult {
        FusionResult {
            global_score: 40.0,
            risk_band: RiskBand::Moderate,
            indicators: vec![],
            summary: String::new(),
        }
    }

    #[test]
    fn describe_fingerprints_the_document() {
        let meta = DocumentMetadata::describe(b"%PDF-1.7 body", "invoice.bin");
        assert_eq!(meta.size, 13);
        assert_eq!(meta.mime_type, "application/pdf");
        assert_eq!(meta.integrity_hash.as_deref().map(str::len), Some(64));
    }

    #[test]
    fn extension_wins_over_magic() {
        assert_eq!(detect_mime_type(b"%PDF", "scan.PNG"), "image/png");
        assert_eq!(detect_mime_type(b"\xFF\xD8\xFF\xE0", "upload"), "image/jpeg");
        assert_eq!(detect_mime_type(b"hello", "upload"), "application/octet-stream");
    }

    #[test]
    fn assembly_copies_fields_and_assigns_fresh_ids() {
        let meta = DocumentMetadata::describe(b"abc", "a.pdf");
        let results: ModuleResults = [ModuleResult::success(ModuleId::Ela, 40.0)]
            .into_iter()
            .collect();
        let first = ReportRecord::assemble(meta.clone(), results.clone(), fusion());
        let second = ReportRecord::assemble(meta.clone(), results, fusion());

        assert_ne!(first.id, second.id);
        assert_eq!(first.filename, "a.pdf");
        assert_eq!(first.uploaded_at, meta.uploaded_at);
        assert_eq!(first.integrity_hash, meta.integrity_hash);
    }

    #[test]
    fn status_reflects_failures() {
        let meta = DocumentMetadata::describe(b"abc", "a.pdf");
        let partial: ModuleResults = [
            ModuleResult::success(ModuleId::Ela, 40.0),
            ModuleResult::failure(ModuleId::Ocr, "timed out"),
        ]
        .into_iter()
        .collect();
        let record = ReportRecord::assemble(meta.clone(), partial, fusion());
        assert_eq!(
            record.status(),
            AnalysisStatus::Partial {
                failed: vec![ModuleId::Ocr]
            }
        );

        let none: ModuleResults = [ModuleResult::failure(ModuleId::Ela, "boom")]
            .into_iter()
            .collect();
        let record = ReportRecord::assemble(meta, none, fusion());
        assert_eq!(record.status(), AnalysisStatus::AllModulesFailed);
        assert_eq!(record.status().error_class(), Some(ErrorClass::Degraded));
    }

    #[test]
    fn record_survives_json_persistence() {
        let meta = DocumentMetadata::describe(b"abc", "a.pdf");
        let results: ModuleResults = [ModuleResult::success(ModuleId::Ocr, 12.5)
            .with_explanation(Explanation::Text(OcrExcerpt {
                raw_text: "Total 120.00".into(),
                ..Default::default()
            }))]
        .into_iter()
        .collect();
        let record = ReportRecord::assemble(meta, results, fusion());

        let json = serde_json::to_string(&record).unwrap();
        let back: ReportRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.ocr_excerpt().unwrap().raw_text, "Total 120.00");
    }
}
