// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types: module identities, per-module results, and the fused
// verdict.

use serde::{Deserialize, Serialize};

/// Identity of a forensic analysis module.
///
/// The set is closed: supporting a new detector means adding a variant here
/// and a matching [`Explanation`] shape, never passing unknown keys through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleId {
    /// Error level analysis (recompression anomalies).
    Ela,
    /// Camera / generator noise fingerprint.
    Noiseprint,
    /// Copy-move duplication detector.
    CopyMove,
    /// Text extraction and textual anomaly detection.
    Ocr,
    /// Diffusion / inpainting artefact detector.
    Diffusion,
    /// Visual tampering localisation (FR-DETR).
    Frdetr,
}

impl ModuleId {
    /// Every known module, in the default registration order.
    pub const ALL: [ModuleId; 6] = [
        Self::Ela,
        Self::Noiseprint,
        Self::CopyMove,
        Self::Ocr,
        Self::Diffusion,
        Self::Frdetr,
    ];

    /// Stable wire name, also used in indicator text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ela => "ela",
            Self::Noiseprint => "noiseprint",
            Self::CopyMove => "copymove",
            Self::Ocr => "ocr",
            Self::Diffusion => "diffusion",
            Self::Frdetr => "frdetr",
        }
    }

    /// Label shown in rendered reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ela => "ELA (compression anomalies)",
            Self::Noiseprint => "NoisePrint (noise signature)",
            Self::CopyMove => "Copy-Move detection",
            Self::Ocr => "OCR (textual consistency)",
            Self::Diffusion => "Diffusion forensics (generative AI)",
            Self::Frdetr => "FR-DETR (visual tampering)",
        }
    }

    /// Parse a wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text evidence extracted by the OCR module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrExcerpt {
    pub raw_text: String,
    #[serde(default)]
    pub dates: Vec<String>,
    #[serde(default)]
    pub numbers: Vec<String>,
    #[serde(default)]
    pub anomalies: Vec<String>,
}

/// Module-specific explanation attached to a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Explanation {
    Compression { message: String },
    NoiseSignature { message: String },
    Duplication { message: String, regions: u32 },
    Text(OcrExcerpt),
    Generative { message: String },
    VisualTampering { message: String },
}

impl Explanation {
    /// One-line description suitable for a report row.
    pub fn headline(&self) -> String {
        match self {
            Self::Compression { message }
            | Self::NoiseSignature { message }
            | Self::Generative { message }
            | Self::VisualTampering { message } => message.clone(),
            Self::Duplication { message, regions } => {
                format!("{message} ({regions} duplicated region(s))")
            }
            Self::Text(excerpt) if excerpt.anomalies.is_empty() => {
                "No textual anomalies".to_owned()
            }
            Self::Text(excerpt) => format!("{} textual anomaly(ies)", excerpt.anomalies.len()),
        }
    }
}

/// Output of one module run, as recorded in a report.
///
/// `success == false` means `score` is `None` and the module is excluded from
/// fusion; `success == true` means `score` is within `0.0..=100.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleResult {
    pub module: ModuleId,
    pub success: bool,
    pub score: Option<f64>,
    pub explanation: Option<Explanation>,
    /// Reference to a heatmap image in the asset store.
    pub heatmap: Option<String>,
    pub error_reason: Option<String>,
}

impl ModuleResult {
    pub fn success(module: ModuleId, score: f64) -> Self {
        Self {
            module,
            success: true,
            score: Some(score),
            explanation: None,
            heatmap: None,
            error_reason: None,
        }
    }

    pub fn failure(module: ModuleId, reason: impl Into<String>) -> Self {
        Self {
            module,
            success: false,
            score: None,
            explanation: None,
            heatmap: None,
            error_reason: Some(reason.into()),
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

    /// Score usable for aggregation, if this result honours its invariant.
    pub fn usable_score(&self) -> Option<f64> {
        match (self.success, self.score) {
            (true, Some(score)) if score.is_finite() && (0.0..=100.0).contains(&score) => {
                Some(score)
            }
            _ => None,
        }
    }
}

/// Results of every registered module, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleResults(Vec<ModuleResult>);

impl ModuleResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the result for `result.module`, keeping the slot of
    /// an existing entry.
    pub fn insert(&mut self, result: ModuleResult) {
        match self.0.iter_mut().find(|r| r.module == result.module) {
            Some(slot) => *slot = result,
            None => self.0.push(result),
        }
    }

    pub fn get(&self, module: ModuleId) -> Option<&ModuleResult> {
        self.0.iter().find(|r| r.module == module)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModuleResult> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Results that can take part in fusion.
    pub fn successes(&self) -> impl Iterator<Item = &ModuleResult> {
        self.0.iter().filter(|r| r.usable_score().is_some())
    }

    pub fn failed_modules(&self) -> Vec<ModuleId> {
        self.0
            .iter()
            .filter(|r| r.usable_score().is_none())
            .map(|r| r.module)
            .collect()
    }
}

impl FromIterator<ModuleResult> for ModuleResults {
    fn from_iter<I: IntoIterator<Item = ModuleResult>>(iter: I) -> Self {
        let mut results = Self::new();
        for result in iter {
            results.insert(result);
        }
        results
    }
}

impl<'a> IntoIterator for &'a ModuleResults {
    type Item = &'a ModuleResult;
    type IntoIter = std::slice::Iter<'a, ModuleResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Coarse classification of the global score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    /// `< 40` Low, `40..=70` Moderate, `> 70` High.
    pub fn from_score(score: f64) -> Self {
        if score < 40.0 {
            Self::Low
        } else if score <= 70.0 {
            Self::Moderate
        } else {
            Self::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The fused verdict for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    pub global_score: f64,
    pub risk_band: RiskBand,
    pub indicators: Vec<String>,
    pub summary: String,
}

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }

    /// Dimensions in PDF points (1pt = 1/72in).
    pub fn dimensions_pt(&self) -> (f32, f32) {
        let (w, h) = self.dimensions_mm();
        (mm_to_pt(w as f32), mm_to_pt(h as f32))
    }
}

fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_names_round_trip_through_serde() {
        let json = serde_json::to_string(&ModuleId::CopyMove).unwrap();
        assert_eq!(json, "\"copymove\"");
        for id in ModuleId::ALL {
            assert_eq!(ModuleId::from_name(id.as_str()), Some(id));
        }
        assert_eq!(ModuleId::from_name("unknown"), None);
    }

    #[test]
    fn risk_band_boundaries() {
        assert_eq!(RiskBand::from_score(39.99), RiskBand::Low);
        assert_eq!(RiskBand::from_score(40.00), RiskBand::Moderate);
        assert_eq!(RiskBand::from_score(70.00), RiskBand::Moderate);
        assert_eq!(RiskBand::from_score(70.01), RiskBand::High);
    }

    #[test]
    fn failed_result_has_no_usable_score() {
        let failed = ModuleResult::failure(ModuleId::Ela, "timed out");
        assert_eq!(failed.usable_score(), None);

        let mut lying = ModuleResult::success(ModuleId::Ela, 20.0);
        lying.success = false;
        assert_eq!(lying.usable_score(), None);

        let out_of_range = ModuleResult::success(ModuleId::Ela, 140.0);
        assert_eq!(out_of_range.usable_score(), None);
    }

    #[test]
    fn insert_keeps_registration_slot() {
        let mut results = ModuleResults::new();
        results.insert(ModuleResult::success(ModuleId::Ocr, 10.0));
        results.insert(ModuleResult::success(ModuleId::Ela, 20.0));
        results.insert(ModuleResult::failure(ModuleId::Ocr, "boom"));

        let order: Vec<_> = results.iter().map(|r| r.module).collect();
        assert_eq!(order, vec![ModuleId::Ocr, ModuleId::Ela]);
        assert_eq!(results.failed_modules(), vec![ModuleId::Ocr]);
        assert_eq!(results.successes().count(), 1);
    }

    #[test]
    fn explanation_is_tagged() {
        let explanation = Explanation::Duplication {
            message: "Copy-move duplication detected".into(),
            regions: 2,
        };
        let json = serde_json::to_value(&explanation).unwrap();
        assert_eq!(json["kind"], "duplication");
        assert!(explanation.headline().contains("2 duplicated"));
    }

    #[test]
    fn a4_in_points() {
        let (w, h) = PaperSize::A4.dimensions_pt();
        assert!((w - 595.28).abs() < 0.01);
        assert!((h - 841.89).abs() < 0.01);
    }
}
