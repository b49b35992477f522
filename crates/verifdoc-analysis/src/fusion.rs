// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Fusion engine: deterministic aggregation of module scores into one verdict.
//
//   globalScore = round(mean(successful scores), 2)
//   riskBand    = <40 Low | 40..=70 Moderate | >70 High
//   indicators  = one line per successful module, in registration order
//   summary     = canned narrative per band

use tracing::{debug, instrument, warn};
use verifdoc_core::config::FusionConfig;
use verifdoc_core::types::{FusionResult, ModuleResults, RiskBand};

/// Summary used when no module produced a score.
pub const INSUFFICIENT_DATA: &str = "insufficient data";

/// Aggregates module results. Holds only configuration, so one engine can
/// fuse any number of runs.
#[derive(Debug, Clone, Default)]
pub struct FusionEngine {
    config: FusionConfig,
}

impl FusionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    /// Fuse a result set into a verdict. Failed modules are ignored.
    #[instrument(skip_all, fields(modules = results.len()))]
    pub fn fuse(&self, results: &ModuleResults) -> FusionResult {
        let mut scores: Vec<f64> = results.successes().filter_map(|r| r.usable_score()).collect();

        if scores.is_empty() {
            warn!("no module produced a score");
            return FusionResult {
                global_score: 0.0,
                risk_band: RiskBand::Low,
                indicators: Vec::new(),
                summary: INSUFFICIENT_DATA.to_owned(),
            };
        }

        // Summing in sorted order keeps the mean independent of module order.
        scores.sort_by(f64::total_cmp);
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        let global_score = round_to_hundredths(mean);
        let risk_band = RiskBand::from_score(global_score);

        let indicators = results
            .successes()
            .filter_map(|r| {
                let score = r.usable_score()?;
                let verdict = if score > self.config.threshold_for(r.module) {
                    "anomaly detected"
                } else {
                    "normal"
                };
                Some(format!("{} {verdict}", r.module))
            })
            .collect();

        debug!(global_score, band = %risk_band, used = scores.len(), "scores fused");

        FusionResult {
            global_score,
            risk_band,
            indicators,
            summary: band_summary(risk_band).to_owned(),
        }
    }
}

/// Fixed narrative for each band.
pub fn band_summary(band: RiskBand) -> &'static str {
    match band {
        RiskBand::Low => {
            "The document appears largely authentic with no significant signs of forgery detected."
        }
        RiskBand::Moderate => {
            "The document shows some anomalies that warrant a manual review before it is relied upon."
        }
        RiskBand::High => {
            "The document shows multiple signs of potential manipulation across various forensic modules."
        }
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use verifdoc_core::types::{ModuleId, ModuleResult};

    use super::*;

    fn results(entries: &[(ModuleId, Option<f64>)]) -> ModuleResults {
        entries
            .iter()
            .map(|(id, score)| match score {
                Some(score) => ModuleResult::success(*id, *score),
                None => ModuleResult::failure(*id, "timed out"),
            })
            .collect()
    }

    #[test]
    fn mean_of_four_is_moderate() {
        let fused = FusionEngine::default().fuse(&results(&[
            (ModuleId::Ela, Some(80.0)),
            (ModuleId::Noiseprint, Some(20.0)),
            (ModuleId::CopyMove, Some(60.0)),
            (ModuleId::Ocr, Some(40.0)),
        ]));
        assert_eq!(fused.global_score, 50.0);
        assert_eq!(fused.risk_band, RiskBand::Moderate);
        assert_eq!(
            fused.indicators,
            vec![
                "ela anomaly detected",
                "noiseprint normal",
                "copymove anomaly detected",
                "ocr normal",
            ]
        );
        assert_eq!(fused.summary, band_summary(RiskBand::Moderate));
    }

    #[test]
    fn failed_module_is_excluded() {
        let fused = FusionEngine::default().fuse(&results(&[
            (ModuleId::Ela, None),
            (ModuleId::Noiseprint, Some(20.0)),
            (ModuleId::CopyMove, Some(60.0)),
            (ModuleId::Ocr, Some(40.0)),
        ]));
        assert_eq!(fused.global_score, 40.0);
        assert_eq!(fused.risk_band, RiskBand::Moderate);
        assert_eq!(fused.indicators.len(), 3);
        assert!(fused.indicators.iter().all(|i| !i.starts_with("ela")));
    }

    #[test]
    fn no_successes_means_insufficient_data() {
        let engine = FusionEngine::default();
        for set in [
            results(&[]),
            results(&[(ModuleId::Ela, None), (ModuleId::Ocr, None)]),
        ] {
            let fused = engine.fuse(&set);
            assert_eq!(fused.global_score, 0.0);
            assert_eq!(fused.risk_band, RiskBand::Low);
            assert_eq!(fused.summary, INSUFFICIENT_DATA);
            assert!(fused.indicators.is_empty());
        }
    }

    #[test]
    fn fusion_is_deterministic_and_order_independent() {
        let engine = FusionEngine::default();
        let forward = results(&[
            (ModuleId::Ela, Some(33.33)),
            (ModuleId::Noiseprint, Some(66.67)),
            (ModuleId::CopyMove, Some(12.01)),
        ]);
        let backward = results(&[
            (ModuleId::CopyMove, Some(12.01)),
            (ModuleId::Noiseprint, Some(66.67)),
            (ModuleId::Ela, Some(33.33)),
        ]);

        assert_eq!(engine.fuse(&forward), engine.fuse(&forward));
        let (a, b) = (engine.fuse(&forward), engine.fuse(&backward));
        assert_eq!(a.global_score, b.global_score);
        assert_eq!(a.risk_band, b.risk_band);
        assert_eq!(a.summary, b.summary);
        assert_eq!(b.indicators[0], "copymove normal");
    }

    #[test]
    fn score_is_rounded_to_two_decimals() {
        let fused = FusionEngine::default().fuse(&results(&[
            (ModuleId::Ela, Some(10.0)),
            (ModuleId::Ocr, Some(10.0)),
            (ModuleId::Frdetr, Some(20.01)),
        ]));
        assert_eq!(fused.global_score, 13.34);
        assert_eq!(fused.risk_band, RiskBand::Low);
    }

    #[test]
    fn band_boundaries_after_rounding() {
        let engine = FusionEngine::default();
        let cases = [
            (39.99, RiskBand::Low),
            (40.0, RiskBand::Moderate),
            (70.0, RiskBand::Moderate),
            (70.01, RiskBand::High),
        ];
        for (score, band) in cases {
            let fused = engine.fuse(&results(&[(ModuleId::Ela, Some(score))]));
            assert_eq!(fused.global_score, score);
            assert_eq!(fused.risk_band, band, "score {score}");
        }
    }

    #[test]
    fn threshold_is_strict_and_configurable() {
        let mut config = FusionConfig::default();
        config.thresholds.insert(ModuleId::Ocr, 30.0);
        let fused = FusionEngine::new(config).fuse(&results(&[
            (ModuleId::Ela, Some(50.0)),
            (ModuleId::Ocr, Some(35.0)),
        ]));
        assert_eq!(fused.indicators, vec!["ela normal", "ocr anomaly detected"]);
    }
}
