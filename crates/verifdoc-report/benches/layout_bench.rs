// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for report layout, PDF encoding and page stream extraction.

use std::collections::BTreeMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use verifdoc_core::config::PageConfig;
use verifdoc_core::record::{DocumentMetadata, ReportRecord};
use verifdoc_core::types::{
    Explanation, FusionResult, ModuleId, ModuleResult, ModuleResults, OcrExcerpt, RiskBand,
};
use verifdoc_report::render_report;

/// A record with every module scored, a long OCR excerpt, and many
/// indicators, so the layout spills over several pages.
fn busy_record() -> ReportRecord {
    let results: ModuleResults = ModuleId::ALL
        .into_iter()
        .map(|id| {
            let result = ModuleResult::success(id, 55.0);
            if id == ModuleId::Ocr {
                result.with_explanation(Explanation::Text(OcrExcerpt {
                    raw_text: "Invoice line item total ".repeat(40),
                    anomalies: vec!["Mismatched total".into(); 12],
                    ..Default::default()
                }))
            } else {
                result.with_explanation(Explanation::Compression {
                    message: "Regional recompression".into(),
                })
            }
        })
        .collect();
    let fusion = FusionResult {
        global_score: 55.0,
        risk_band: RiskBand::Moderate,
        indicators: (0..30).map(|i| format!("indicator {i} anomaly detected")).collect(),
        summary: "Some anomalies warrant a manual review.".into(),
    };
    ReportRecord::assemble(
        DocumentMetadata::describe(b"%PDF-1.7 bench", "bench.pdf"),
        results,
        fusion,
    )
}

fn bench_render_report(c: &mut Criterion) {
    let record = busy_record();
    let assets = BTreeMap::new();
    let config = PageConfig::default();

    c.bench_function("render_report (no assets)", |b| {
        b.iter(|| black_box(render_report(black_box(&record), &assets, &config)));
    });
}

criterion_group!(benches, bench_render_report);
criterion_main!(benches);
