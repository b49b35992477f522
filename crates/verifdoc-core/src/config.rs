// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine configuration: module scheduling, fusion thresholds, page geometry,
// and asset scaling. Persisted as pretty-printed JSON.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, VerifdocError};
use crate::types::{ModuleId, PaperSize};

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub orchestrator: OrchestratorConfig,
    pub fusion: FusionConfig,
    pub page: PageConfig,
    pub embedder: EmbedderConfig,
}

impl EngineConfig {
    /// Load a configuration file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.page.validate()?;
        info!(path = %path.as_ref().display(), "configuration loaded");
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        debug!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }
}

/// Module scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Per-module time budget in milliseconds.
    pub module_timeout_ms: u64,
    /// Upper bound on modules running at the same time.
    pub max_concurrent_modules: usize,
}

impl OrchestratorConfig {
    pub fn module_timeout(&self) -> Duration {
        Duration::from_millis(self.module_timeout_ms)
    }

    /// Worker limit, never below one.
    pub fn worker_limit(&self) -> usize {
        self.max_concurrent_modules.max(1)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            module_timeout_ms: 30_000,
            max_concurrent_modules: 4,
        }
    }
}

/// Fusion thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Score above which a module reports an anomaly.
    pub default_threshold: f64,
    /// Per-module overrides of `default_threshold`.
    pub thresholds: BTreeMap<ModuleId, f64>,
}

impl FusionConfig {
    pub fn threshold_for(&self, module: ModuleId) -> f64 {
        self.thresholds
            .get(&module)
            .copied()
            .unwrap_or(self.default_threshold)
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            default_threshold: 50.0,
            thresholds: BTreeMap::new(),
        }
    }
}

/// Page geometry for report rendering, in PDF points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub page_width: f32,
    pub page_height: f32,
    /// Left and right margin.
    pub margin: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    /// Extra space above a section title.
    pub section_spacing: f32,
    /// Space left below every block.
    pub block_spacing: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    pub image_max_width: f32,
    pub image_max_height: f32,
    /// Band above the bottom margin reserved for the footer stamp.
    pub footer_height: f32,
    /// Average glyph width relative to the font size, used for line wrapping.
    pub char_width_factor: f32,
}

impl PageConfig {
    /// Geometry for a paper size with the default margins and spacing.
    pub fn for_paper(paper: PaperSize) -> Self {
        Self::default().with_paper(paper)
    }

    /// Switch to another paper size. Margins, spacing and the footer band are
    /// kept; image width follows the new content width.
    pub fn with_paper(mut self, paper: PaperSize) -> Self {
        (self.page_width, self.page_height) = paper.dimensions_pt();
        self.image_max_width = self.content_width();
        self
    }

    /// Width available to text and images.
    pub fn content_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Y coordinate where the main flow starts on every page.
    pub fn content_top(&self) -> f32 {
        self.page_height - self.margin_top
    }

    /// Lowest Y coordinate the main flow may reach.
    pub fn content_floor(&self) -> f32 {
        self.margin_bottom + self.footer_height
    }

    /// Height one page offers to a single block.
    pub fn usable_height(&self) -> f32 {
        self.content_top() - self.content_floor()
    }

    /// Reject geometry that leaves no room for content.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.page_width,
            self.page_height,
            self.margin,
            self.margin_top,
            self.margin_bottom,
            self.section_spacing,
            self.block_spacing,
            self.line_height,
            self.image_max_width,
            self.image_max_height,
            self.footer_height,
            self.char_width_factor,
        ]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0);
        if !finite {
            return Err(VerifdocError::InvalidPageConfig(
                "values must be finite and non-negative".into(),
            ));
        }
        if self.content_width() <= 0.0 {
            return Err(VerifdocError::InvalidPageConfig(format!(
                "margins of {}pt leave no width on a {}pt page",
                self.margin, self.page_width
            )));
        }
        if self.usable_height() <= 0.0 {
            return Err(VerifdocError::InvalidPageConfig(format!(
                "margins and footer leave no height on a {}pt page",
                self.page_height
            )));
        }
        if self.line_height < 1.0 {
            return Err(VerifdocError::InvalidPageConfig(
                "line height multiplier must be at least 1.0".into(),
            ));
        }
        if self.char_width_factor <= 0.0 {
            return Err(VerifdocError::InvalidPageConfig(
                "character width factor must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_width: 595.28,
            page_height: 841.89,
            margin: 50.0,
            margin_top: 50.0,
            margin_bottom: 50.0,
            section_spacing: 25.0,
            block_spacing: 6.0,
            line_height: 1.5,
            image_max_width: 495.28,
            image_max_height: 150.0,
            footer_height: 60.0,
            char_width_factor: 0.5,
        }
    }
}

/// Asset scaling policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    /// Allow images smaller than the bounds to be enlarged to fit them.
    pub allow_upscale: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.page.validate().is_ok());
        assert_eq!(config.fusion.threshold_for(ModuleId::Ela), 50.0);
        assert_eq!(config.orchestrator.module_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn threshold_overrides_apply_per_module() {
        let mut fusion = FusionConfig::default();
        fusion.thresholds.insert(ModuleId::Ocr, 65.0);
        assert_eq!(fusion.threshold_for(ModuleId::Ocr), 65.0);
        assert_eq!(fusion.threshold_for(ModuleId::Ela), 50.0);
    }

    #[test]
    fn zero_workers_is_clamped() {
        let config = OrchestratorConfig {
            max_concurrent_modules: 0,
            ..Default::default()
        };
        assert_eq!(config.worker_limit(), 1);
    }

    #[test]
    fn oversized_margins_are_rejected() {
        let page = PageConfig {
            margin_top: 500.0,
            margin_bottom: 400.0,
            ..Default::default()
        };
        assert!(matches!(
            page.validate(),
            Err(VerifdocError::InvalidPageConfig(_))
        ));
    }

    #[test]
    fn letter_geometry() {
        let page = PageConfig::for_paper(PaperSize::Letter);
        assert!((page.page_width - 612.28).abs() < 0.1);
        assert!((page.content_width() - page.image_max_width).abs() < 0.001);
    }

    #[test]
    fn paper_change_keeps_custom_margins() {
        let custom = PageConfig {
            margin: 36.0,
            margin_bottom: 72.0,
            footer_height: 40.0,
            section_spacing: 12.0,
            ..Default::default()
        };
        let (width, height) = PaperSize::A5.dimensions_pt();
        let a5 = custom.clone().with_paper(PaperSize::A5);

        assert_eq!((a5.page_width, a5.page_height), (width, height));
        assert_eq!(a5.image_max_width, width - 72.0);
        assert_eq!(a5.margin, 36.0);
        assert_eq!(a5.margin_bottom, 72.0);
        assert_eq!(a5.footer_height, 40.0);
        assert_eq!(a5.section_spacing, 12.0);
        assert_eq!(a5.image_max_height, custom.image_max_height);
    }

    #[test]
    fn partial_file_fills_defaults_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "fusion": { "thresholds": { "ela": 70.0 } }, "page": { "margin": 36.0 } }"#,
        )
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.fusion.threshold_for(ModuleId::Ela), 70.0);
        assert_eq!(config.page.margin, 36.0);
        assert_eq!(config.page.margin_top, 50.0);

        config.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), config);
    }
}
