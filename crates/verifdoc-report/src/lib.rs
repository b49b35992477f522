// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// verifdoc-report: lays a finished `ReportRecord` out into pages, embeds its
// heatmaps, and encodes the result as PDF.
//
// The page content streams handed back by `render_report` are read out of the
// encoded PDF, and depend only on the record, the asset bytes and the page
// configuration.

pub mod compose;
pub mod embed;
pub mod layout;
pub mod page;
pub mod pdf;
pub mod text;

#[cfg(test)]
mod fixtures;

use std::collections::BTreeMap;

use tracing::{info, instrument};
use verifdoc_core::config::{EmbedderConfig, EngineConfig, PageConfig};
use verifdoc_core::error::Result;
use verifdoc_core::record::ReportRecord;

pub use embed::{AssetEmbedder, AssetHandle, AssetStore, EmbeddedAsset};
pub use layout::{Block, BlockContent, FlowState, Footer, LayoutCursor, LayoutEngine};
pub use page::{DrawCommand, Page, Point, TextStyle};
pub use pdf::PdfEncoder;

/// Laid-out pages together with the images they reference.
#[derive(Debug)]
pub struct RenderedReport {
    pub pages: Vec<Page>,
    pub assets: AssetStore,
}

impl RenderedReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Renders report records with a fixed page geometry and scaling policy.
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    page: PageConfig,
    embedder: EmbedderConfig,
}

impl ReportRenderer {
    pub fn new(page: PageConfig, embedder: EmbedderConfig) -> Self {
        Self { page, embedder }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.page.clone(), config.embedder.clone())
    }

    /// Compose and paginate `record`. Nothing partial is returned on error.
    #[instrument(skip_all, fields(report_id = %record.id, assets = assets.len()))]
    pub fn layout(
        &self,
        record: &ReportRecord,
        assets: &BTreeMap<String, Vec<u8>>,
    ) -> Result<RenderedReport> {
        self.page.validate()?;
        let mut embedder = AssetEmbedder::new(&self.embedder);
        let composition = compose::compose(record, assets, &self.page, &mut embedder)?;
        let pages =
            layout::layout_blocks(&composition.blocks, &self.page, Some(&composition.footer))?;
        info!(pages = pages.len(), "report laid out");
        Ok(RenderedReport {
            pages,
            assets: embedder.into_store(),
        })
    }

    /// Lay out `record` and encode it as a complete PDF document.
    pub fn render_pdf(
        &self,
        record: &ReportRecord,
        assets: &BTreeMap<String, Vec<u8>>,
    ) -> Result<Vec<u8>> {
        let rendered = self.layout(record, assets)?;
        PdfEncoder::new(format!("VerifDoc report {}", record.id))
            .encode(&rendered.pages, &rendered.assets)
    }
}

/// Render `record` into one content stream per page, taken from the PDF
/// that `ReportRenderer::render_pdf` produces for the same inputs.
pub fn render_report(
    record: &ReportRecord,
    assets: &BTreeMap<String, Vec<u8>>,
    page_config: &PageConfig,
) -> Result<Vec<Vec<u8>>> {
    let renderer = ReportRenderer::new(page_config.clone(), EmbedderConfig::default());
    let pdf = renderer.render_pdf(record, assets)?;
    pdf::page_streams(&pdf)
}
