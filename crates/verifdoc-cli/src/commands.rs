// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations. Each returns the text to print on success.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use tracing::{debug, info, instrument, warn};
use verifdoc_core::config::EngineConfig;
use verifdoc_core::error::Result;
use verifdoc_core::integrity::{hash_bytes, matches_hash};
use verifdoc_core::record::{AnalysisStatus, ReportRecord};
use verifdoc_core::types::PaperSize;
use verifdoc_report::{PdfEncoder, ReportRenderer};

use crate::cli::{InspectArgs, RenderArgs};

pub fn load_record(path: &Path) -> Result<ReportRecord> {
    let data = std::fs::read_to_string(path)?;
    let record: ReportRecord = serde_json::from_str(&data)?;
    debug!(report_id = %record.id, "record loaded");
    Ok(record)
}

/// Read every heatmap the record references from `dir`.
///
/// Only the file name of each reference is used. Missing files are left out
/// so the report shows a note in their place.
pub fn load_assets(record: &ReportRecord, dir: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut assets = BTreeMap::new();
    for (module, asset_ref) in record.heatmaps() {
        let Some(name) = Path::new(asset_ref).file_name() else {
            warn!(%module, asset_ref, "heatmap reference has no file name");
            continue;
        };
        let path = dir.join(name);
        if !path.is_file() {
            warn!(%module, path = %path.display(), "heatmap file not found");
            continue;
        }
        assets.insert(asset_ref.to_owned(), std::fs::read(&path)?);
    }
    Ok(assets)
}

/// Configuration for `render`: the file given with `--config` (or defaults),
/// resized to `--paper` when one is given.
pub fn render_config(args: &RenderArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(paper) = args.paper {
        config.page = config.page.with_paper(PaperSize::from(paper));
        config.page.validate()?;
    }
    Ok(config)
}

#[instrument(skip_all, fields(record = %args.record.display(), out = %args.out.display()))]
pub fn render(args: &RenderArgs) -> Result<String> {
    let config = render_config(args)?;

    let record = load_record(&args.record)?;
    let assets = match &args.assets {
        Some(dir) => load_assets(&record, dir)?,
        None => BTreeMap::new(),
    };

    let rendered = ReportRenderer::from_config(&config).layout(&record, &assets)?;
    let pdf = PdfEncoder::new(format!("VerifDoc report {}", record.id))
        .encode(&rendered.pages, &rendered.assets)?;
    std::fs::write(&args.out, &pdf)?;

    let digest = hash_bytes(&pdf);
    info!(pages = rendered.page_count(), sha256 = %digest, "report written");
    Ok(format!(
        "wrote {} ({} page(s), {} bytes)\nsha256 {digest}",
        args.out.display(),
        rendered.page_count(),
        pdf.len()
    ))
}

pub fn inspect(args: &InspectArgs) -> Result<String> {
    let record = load_record(&args.record)?;
    let mut out = describe_record(&record);
    if let Some(path) = &args.document {
        let document = std::fs::read(path)?;
        let verdict = match record.integrity_hash.as_deref() {
            None => "no hash recorded",
            Some(expected) if matches_hash(&document, expected) => "ok",
            Some(_) => {
                warn!(path = %path.display(), "document does not match the recorded hash");
                "MISMATCH"
            }
        };
        let _ = write!(out, "\nintegrity {verdict}");
    }
    Ok(out)
}

pub fn default_config() -> Result<String> {
    Ok(serde_json::to_string_pretty(&EngineConfig::default())?)
}

fn describe_record(record: &ReportRecord) -> String {
    let status = match record.status() {
        AnalysisStatus::Complete => "complete".to_owned(),
        AnalysisStatus::Partial { failed } => {
            let names: Vec<&str> = failed.iter().map(|m| m.as_str()).collect();
            format!("partial (failed: {})", names.join(", "))
        }
        AnalysisStatus::AllModulesFailed => "all modules failed (insufficient data)".to_owned(),
    };
    let modules: Vec<String> = record
        .module_results
        .iter()
        .map(|r| match r.usable_score() {
            Some(score) => format!("{} {score:.2}", r.module),
            None => format!("{} failed", r.module),
        })
        .collect();

    let mut out = String::new();
    let _ = writeln!(out, "report   {}", record.id);
    let _ = writeln!(
        out,
        "file     {} ({} bytes, {})",
        record.filename, record.size, record.mime_type
    );
    let _ = writeln!(
        out,
        "score    {:.2} ({})",
        record.fusion.global_score, record.fusion.risk_band
    );
    let _ = writeln!(out, "status   {status}");
    let _ = write!(out, "modules  {}", modules.join(", "));
    out
}
