// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared test inputs: encoded images and a representative report record.

use std::collections::BTreeMap;
use std::io::Cursor;

use chrono::{TimeZone, Utc};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use verifdoc_core::record::{DocumentMetadata, ReportRecord};
use verifdoc_core::types::{
    Explanation, FusionResult, ModuleId, ModuleResult, ModuleResults, OcrExcerpt, RiskBand,
};

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

pub fn record() -> ReportRecord {
    let uploaded = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
    let metadata =
        DocumentMetadata::describe(b"%PDF-1.7 sample", "facture_été.pdf").with_uploaded_at(uploaded);

    let results: ModuleResults = [
        ModuleResult::success(ModuleId::Ela, 80.0)
            .with_explanation(Explanation::Compression {
                message: "Recompression detected around the total".into(),
            })
            .with_heatmap("ela.png"),
        ModuleResult::success(ModuleId::Noiseprint, 20.0).with_heatmap("noiseprint.png"),
        ModuleResult::failure(ModuleId::CopyMove, "timed out after 30000 ms"),
        ModuleResult::success(ModuleId::Ocr, 50.0).with_explanation(Explanation::Text(
            OcrExcerpt {
                raw_text: "Invoice 2026-014 Total 120.00 EUR".into(),
                dates: vec!["2026-03-01".into()],
                numbers: vec!["120.00".into()],
                anomalies: vec!["Total does not match line items".into()],
            },
        )),
    ]
    .into_iter()
    .collect();

    let fusion = FusionResult {
        global_score: 50.0,
        risk_band: RiskBand::Moderate,
        indicators: vec![
            "ela anomaly detected".into(),
            "noiseprint normal".into(),
            "ocr normal".into(),
        ],
        summary: "The document shows some anomalies that warrant a manual review.".into(),
    };

    ReportRecord::assemble(metadata, results, fusion)
}

/// Assets for every heatmap the sample record references.
pub fn assets() -> BTreeMap<String, Vec<u8>> {
    BTreeMap::from([
        ("ela.png".to_owned(), png(800, 400)),
        ("noiseprint.png".to_owned(), png(64, 64)),
    ])
}
