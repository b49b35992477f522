// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report composition: turn a `ReportRecord` into the ordered block sequence
// the layout engine places.
//
// Sections, in order: header, document information, global score, key
// indicators, summary, module details, heatmaps, OCR excerpt, conclusion.

use std::collections::BTreeMap;

use tracing::{debug, instrument, warn};
use verifdoc_core::config::PageConfig;
use verifdoc_core::error::Result;
use verifdoc_core::integrity::short_fingerprint;
use verifdoc_core::record::{AnalysisStatus, ReportRecord};
use verifdoc_core::types::{ModuleResult, OcrExcerpt};

use crate::embed::AssetEmbedder;
use crate::layout::{Block, Footer};
use crate::page::TextStyle;
use crate::text::{format_bytes, truncate_chars};

/// Characters of OCR text reproduced in a report.
pub const OCR_EXCERPT_LIMIT: usize = 500;
/// Height of the score gauge.
pub const GAUGE_HEIGHT: f32 = 10.0;

const BODY: f32 = 12.0;
const SMALL: f32 = 10.0;
const INDENT: f32 = 10.0;

const CONCLUSION: &str = "This report was generated automatically by VerifDoc from multi-layer \
    AI analyses. It provides an objective assessment of the document's authenticity based on \
    advanced forgery-detection algorithms.";

/// Blocks and footer content for one report.
#[derive(Debug, Clone)]
pub struct Composition {
    pub blocks: Vec<Block>,
    pub footer: Footer,
}

/// Build the report content for `record`.
///
/// Heatmaps are decoded through `embedder`. A heatmap missing from `assets`
/// becomes a note; one that is present but undecodable fails the call.
#[instrument(skip_all, fields(report_id = %record.id))]
pub fn compose(
    record: &ReportRecord,
    assets: &BTreeMap<String, Vec<u8>>,
    config: &PageConfig,
    embedder: &mut AssetEmbedder,
) -> Result<Composition> {
    let spacing = config.section_spacing;
    let mut blocks = Vec::new();

    header(record, &mut blocks);

    blocks.push(Block::title("section:document", "Document Information", spacing));
    document_info(record, &mut blocks);

    blocks.push(Block::title("section:score", "Global VerifDoc Score", spacing));
    blocks.push(Block::text(
        "score:value",
        &format!("VerifDoc score: {:.2}%", record.fusion.global_score),
        14.0,
        TextStyle::Brand,
    ));
    blocks.push(Block::text(
        "score:band",
        &format!("Risk band: {}", record.fusion.risk_band),
        BODY,
        TextStyle::Label,
    ));
    let fraction = (record.fusion.global_score / 100.0).clamp(0.0, 1.0) as f32;
    blocks.push(Block::gauge("score:gauge", fraction, GAUGE_HEIGHT));

    blocks.push(Block::title("section:indicators", "Key Indicators", spacing));
    if record.fusion.indicators.is_empty() {
        blocks.push(Block::text(
            "indicators:none",
            "No specific indicator detected.",
            BODY,
            TextStyle::Muted,
        ));
    }
    for (i, indicator) in record.fusion.indicators.iter().enumerate() {
        let text = format!("* {indicator}");
        blocks.push(
            Block::text(format!("indicator:{i}"), &text, BODY, TextStyle::Body).indented(INDENT),
        );
    }

    blocks.push(Block::title("section:summary", "Analysis Summary", spacing));
    blocks.push(Block::text("summary", &record.fusion.summary, BODY, TextStyle::Body));

    blocks.push(Block::title("section:modules", "Module Details", spacing));
    if record.module_results.is_empty() {
        blocks.push(Block::text(
            "modules:none",
            "No analysis module was run.",
            BODY,
            TextStyle::Muted,
        ));
    }
    for result in &record.module_results {
        module_detail(result, &mut blocks);
    }

    blocks.push(Block::title("section:heatmaps", "Forensic Heatmaps", spacing));
    heatmaps(record, assets, config, embedder, &mut blocks)?;

    blocks.push(Block::title("section:ocr", "OCR Information", spacing));
    match record.ocr_excerpt() {
        Some(excerpt) => ocr(excerpt, &mut blocks),
        None => blocks.push(Block::text(
            "ocr:none",
            "No OCR information available.",
            BODY,
            TextStyle::Muted,
        )),
    }

    blocks.push(Block::title("section:conclusion", "Conclusion", spacing));
    if record.status() == AnalysisStatus::AllModulesFailed {
        blocks.push(Block::text(
            "conclusion:degraded",
            "No analysis module produced a usable result, so the document could not be assessed.",
            BODY,
            TextStyle::Alert,
        ));
    }
    blocks.push(Block::text("conclusion", CONCLUSION, BODY, TextStyle::Body));

    debug!(blocks = blocks.len(), "report composed");
    Ok(Composition {
        blocks,
        footer: footer(record),
    })
}

fn header(record: &ReportRecord, blocks: &mut Vec<Block>) {
    blocks.push(Block::text("header:brand", "VerifDoc", 24.0, TextStyle::Brand));
    blocks.push(Block::text(
        "header:title",
        "Document Forensic Report",
        20.0,
        TextStyle::Heading,
    ));
    blocks.push(Block::text(
        "header:subtitle",
        "Advanced AI & forensic analysis",
        14.0,
        TextStyle::Subtitle,
    ));
    blocks.push(Block::text(
        "header:date",
        &format!(
            "Analysis date: {}",
            record.uploaded_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        SMALL,
        TextStyle::Muted,
    ));
}

fn document_info(record: &ReportRecord, blocks: &mut Vec<Block>) {
    let uploaded = record.uploaded_at.format("%Y-%m-%d %H:%M:%S UTC");
    let hash = record.integrity_hash.as_deref().unwrap_or("not computed");
    let signature = match &record.signature_info {
        Some(sig) => {
            let mut text = format!(
                "Digital signature: {} ({})",
                sig.signer,
                if sig.valid { "valid" } else { "INVALID" }
            );
            if let Some(algorithm) = &sig.algorithm {
                text.push_str(&format!(", {algorithm}"));
            }
            if let Some(signed_at) = sig.signed_at {
                text.push_str(&format!(", signed {}", signed_at.format("%Y-%m-%d")));
            }
            text
        }
        None => "Digital signature: none".to_owned(),
    };
    let objects = record.embedded_objects_info.as_deref().unwrap_or_default();
    let embedded = if objects.is_empty() {
        "Embedded objects: none".to_owned()
    } else {
        format!("Embedded objects: {}", objects.len())
    };

    let lines = [
        ("filename", format!("File name: {}", record.filename)),
        ("size", format!("Size: {}", format_bytes(record.size))),
        ("type", format!("Type: {}", record.mime_type)),
        ("uploaded", format!("Uploaded: {uploaded}")),
        ("id", format!("Report ID: {}", record.id)),
        ("hash", format!("Integrity hash (SHA-256): {hash}")),
        ("signature", signature),
        ("embedded", embedded),
    ];
    for (key, text) in lines {
        blocks.push(Block::text(format!("document:{key}"), &text, BODY, TextStyle::Body));
    }

    for (i, object) in objects.iter().enumerate() {
        let text = format!(
            "* {} ({}, {})",
            object.name,
            object.kind,
            format_bytes(object.size)
        );
        blocks.push(
            Block::text(format!("document:embedded:{i}"), &text, SMALL, TextStyle::Body)
                .indented(INDENT),
        );
    }
}

fn module_detail(result: &ModuleResult, blocks: &mut Vec<Block>) {
    let label = result.module.label();
    let id = result.module.as_str();

    match result.usable_score() {
        Some(score) => {
            blocks.push(
                Block::text(
                    format!("module:{id}"),
                    &format!("{label}: {score:.2}/100"),
                    BODY,
                    TextStyle::Label,
                )
                .kept_with_next(),
            );
            let detail = result
                .explanation
                .as_ref()
                .map(|e| e.headline())
                .unwrap_or_else(|| "No explanation provided.".to_owned());
            blocks.push(
                Block::text(format!("module:{id}:detail"), &detail, SMALL, TextStyle::Body)
                    .indented(INDENT),
            );
        }
        None => {
            blocks.push(
                Block::text(
                    format!("module:{id}"),
                    &format!("{label}: failed"),
                    BODY,
                    TextStyle::Alert,
                )
                .kept_with_next(),
            );
            let reason = result.error_reason.as_deref().unwrap_or("no reason given");
            blocks.push(
                Block::text(
                    format!("module:{id}:detail"),
                    &format!("Reason: {reason}"),
                    SMALL,
                    TextStyle::Alert,
                )
                .indented(INDENT),
            );
        }
    }
}

fn heatmaps(
    record: &ReportRecord,
    assets: &BTreeMap<String, Vec<u8>>,
    config: &PageConfig,
    embedder: &mut AssetEmbedder,
    blocks: &mut Vec<Block>,
) -> Result<()> {
    let references = record.heatmaps();
    if references.is_empty() {
        blocks.push(Block::text(
            "heatmaps:none",
            "No heatmap was generated.",
            BODY,
            TextStyle::Muted,
        ));
        return Ok(());
    }

    blocks.push(Block::text(
        "heatmaps:intro",
        "These heatmaps highlight the areas detected as potentially manipulated.",
        SMALL,
        TextStyle::Subtitle,
    ));

    let max_width = config.image_max_width.min(config.content_width());
    for (module, asset_ref) in references {
        let label = module.label();
        let Some(bytes) = assets.get(asset_ref) else {
            warn!(%module, asset_ref, "heatmap asset missing");
            blocks.push(Block::text(
                format!("heatmap:{module}:missing"),
                &format!("Heatmap for {label} is not available ({asset_ref})."),
                SMALL,
                TextStyle::Muted,
            ));
            continue;
        };

        let embedded = embedder.embed(asset_ref, bytes, max_width, config.image_max_height)?;
        blocks.push(
            Block::text(
                format!("heatmap:{module}:caption"),
                &format!("{label} heatmap"),
                BODY,
                TextStyle::Label,
            )
            .kept_with_next(),
        );
        blocks.push(Block::image(
            format!("heatmap:{module}"),
            embedded.handle.as_str(),
            embedded.scaled_width,
            embedded.scaled_height,
        ));
    }
    Ok(())
}

fn ocr(excerpt: &OcrExcerpt, blocks: &mut Vec<Block>) {
    blocks.push(
        Block::text("ocr:text:label", "Extracted text:", BODY, TextStyle::Label).kept_with_next(),
    );
    if excerpt.raw_text.trim().is_empty() {
        blocks.push(Block::text(
            "ocr:text:0",
            "No text extracted.",
            SMALL,
            TextStyle::Subtitle,
        ));
    } else {
        // One block per source line, so a long excerpt can break between pages.
        let text = truncate_chars(&excerpt.raw_text, OCR_EXCERPT_LIMIT);
        let lines = text.lines().map(str::trim_end).filter(|l| !l.trim().is_empty());
        for (i, line) in lines.enumerate() {
            blocks.push(Block::text(
                format!("ocr:text:{i}"),
                line,
                SMALL,
                TextStyle::Subtitle,
            ));
        }
    }

    for (key, heading, values) in [
        ("dates", "Detected dates:", &excerpt.dates),
        ("numbers", "Detected numbers:", &excerpt.numbers),
    ] {
        if values.is_empty() {
            continue;
        }
        blocks.push(
            Block::text(format!("ocr:{key}:label"), heading, BODY, TextStyle::Label)
                .kept_with_next(),
        );
        blocks.push(Block::text(
            format!("ocr:{key}"),
            &values.join(", "),
            SMALL,
            TextStyle::Subtitle,
        ));
    }

    if !excerpt.anomalies.is_empty() {
        blocks.push(
            Block::text("ocr:anomalies:label", "OCR anomalies:", BODY, TextStyle::Alert)
                .kept_with_next(),
        );
        for (i, anomaly) in excerpt.anomalies.iter().enumerate() {
            blocks.push(
                Block::text(
                    format!("ocr:anomaly:{i}"),
                    &format!("* {anomaly}"),
                    SMALL,
                    TextStyle::Alert,
                )
                .indented(INDENT),
            );
        }
    }
}

fn footer(record: &ReportRecord) -> Footer {
    let fingerprint = record
        .integrity_hash
        .as_deref()
        .map(short_fingerprint)
        .unwrap_or("unsealed")
        .to_owned();
    Footer {
        notes: vec![
            "Report generated automatically by VerifDoc".to_owned(),
            "Digital integrity seal".to_owned(),
        ],
        seal: vec!["VerifDoc seal".to_owned(), fingerprint],
    }
}

#[cfg(test)]
mod tests {
    use verifdoc_core::error::VerifdocError;
    use verifdoc_core::types::{Explanation, ModuleId};

    use super::*;
    use crate::fixtures;
    use crate::layout::BlockContent;

    fn find<'a>(blocks: &'a [Block], id: &str) -> &'a Block {
        blocks
            .iter()
            .find(|b| b.id == id)
            .unwrap_or_else(|| panic!("no block {id}"))
    }

    fn text_of(block: &Block) -> &str {
        match &block.content {
            BlockContent::Text { text, .. } => text,
            other => panic!("not a text block: {other:?}"),
        }
    }

    fn compose_with(
        record: &ReportRecord,
        assets: &BTreeMap<String, Vec<u8>>,
    ) -> Result<Composition> {
        let mut embedder = AssetEmbedder::default();
        compose(record, assets, &PageConfig::default(), &mut embedder)
    }

    #[test]
    fn sections_follow_the_report_order() {
        let composition = compose_with(&fixtures::record(), &fixtures::assets()).unwrap();
        let titles: Vec<&str> = composition
            .blocks
            .iter()
            .filter(|b| b.id.starts_with("section:"))
            .map(|b| b.id.as_str())
            .collect();
        assert_eq!(
            titles,
            vec![
                "section:document",
                "section:score",
                "section:indicators",
                "section:summary",
                "section:modules",
                "section:heatmaps",
                "section:ocr",
                "section:conclusion",
            ]
        );
    }

    #[test]
    fn header_uses_the_record_timestamp_and_ascii_text() {
        let composition = compose_with(&fixtures::record(), &fixtures::assets()).unwrap();
        let date = find(&composition.blocks, "header:date");
        assert_eq!(text_of(date), "Analysis date: 2026-03-14 09:30:00 UTC");

        let filename = find(&composition.blocks, "document:filename");
        assert_eq!(text_of(filename), "File name: facture_ete.pdf");
    }

    #[test]
    fn heatmaps_are_scaled_into_the_image_bounds() {
        let composition = compose_with(&fixtures::record(), &fixtures::assets()).unwrap();
        match &find(&composition.blocks, "heatmap:ela").content {
            BlockContent::Image {
                asset,
                width,
                height,
            } => {
                assert_eq!(asset, "ela.png");
                assert_eq!((*width, *height), (300.0, 150.0));
            }
            other => panic!("expected image, got {other:?}"),
        }
        let caption = find(&composition.blocks, "heatmap:ela:caption");
        assert!(caption.keep_with_next);
    }

    #[test]
    fn missing_heatmap_becomes_a_note() {
        let mut assets = fixtures::assets();
        assets.remove("noiseprint.png");
        let composition = compose_with(&fixtures::record(), &assets).unwrap();

        let note = find(&composition.blocks, "heatmap:noiseprint:missing");
        assert!(text_of(note).contains("noiseprint.png"));
        assert!(composition.blocks.iter().all(|b| b.id != "heatmap:noiseprint"));
    }

    #[test]
    fn undecodable_heatmap_fails_the_composition() {
        let mut assets = fixtures::assets();
        assets.insert("ela.png".into(), b"corrupt".to_vec());
        match compose_with(&fixtures::record(), &assets) {
            Err(VerifdocError::Decode { asset, .. }) => assert_eq!(asset, "ela.png"),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn failed_module_shows_its_reason() {
        let composition = compose_with(&fixtures::record(), &fixtures::assets()).unwrap();
        let row = find(&composition.blocks, "module:copymove");
        assert_eq!(text_of(row), "Copy-Move detection: failed");
        let reason = find(&composition.blocks, "module:copymove:detail");
        assert_eq!(text_of(reason), "Reason: timed out after 30000 ms");
    }

    #[test]
    fn ocr_text_is_truncated() {
        let mut record = fixtures::record();
        let mut results = record.module_results.clone();
        results.insert(
            ModuleResult::success(ModuleId::Ocr, 10.0).with_explanation(Explanation::Text(
                OcrExcerpt {
                    raw_text: "a".repeat(620),
                    ..Default::default()
                },
            )),
        );
        record.module_results = results;

        let composition = compose_with(&record, &fixtures::assets()).unwrap();
        let text = text_of(find(&composition.blocks, "ocr:text:0"));
        assert_eq!(text.len(), OCR_EXCERPT_LIMIT + 3);
        assert!(text.ends_with("..."));
        assert!(composition.blocks.iter().all(|b| !b.id.starts_with("ocr:anomaly")));
    }

    #[test]
    fn ocr_text_gets_one_block_per_line() {
        let mut record = fixtures::record();
        let mut results = record.module_results.clone();
        results.insert(
            ModuleResult::success(ModuleId::Ocr, 10.0).with_explanation(Explanation::Text(
                OcrExcerpt {
                    raw_text: "Invoice 2026-114\n\nTotal  120.00 EUR   \nDue 2026-04-01".into(),
                    ..Default::default()
                },
            )),
        );
        record.module_results = results;

        let composition = compose_with(&record, &fixtures::assets()).unwrap();
        let lines: Vec<&str> = composition
            .blocks
            .iter()
            .filter(|b| b.id.starts_with("ocr:text:") && b.id != "ocr:text:label")
            .map(text_of)
            .collect();
        assert_eq!(lines, vec!["Invoice 2026-114", "Total  120.00 EUR", "Due 2026-04-01"]);
        assert_eq!(text_of(find(&composition.blocks, "ocr:text:2")), "Due 2026-04-01");
    }

    #[test]
    fn empty_indicators_get_a_note() {
        let mut record = fixtures::record();
        record.fusion.indicators.clear();
        let composition = compose_with(&record, &fixtures::assets()).unwrap();
        assert_eq!(
            text_of(find(&composition.blocks, "indicators:none")),
            "No specific indicator detected."
        );
    }

    #[test]
    fn footer_seal_carries_the_hash_prefix() {
        let record = fixtures::record();
        let composition = compose_with(&record, &fixtures::assets()).unwrap();
        let hash = record.integrity_hash.as_deref().unwrap();
        assert_eq!(composition.footer.seal[1], &hash[..16]);
    }
}
