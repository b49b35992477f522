// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use verifdoc_core::types::PaperSize;

#[derive(Parser, Debug)]
#[command(name = "verifdoc", author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a persisted report record into a PDF
    Render(RenderArgs),
    /// Summarise a persisted report record
    Inspect(InspectArgs),
    /// Print the default engine configuration as JSON
    Config,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Report record (JSON)
    #[arg(short, long)]
    pub record: PathBuf,

    /// Directory holding the heatmap images the record references
    #[arg(short, long)]
    pub assets: Option<PathBuf>,

    /// Engine configuration (JSON); defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Paper size, overriding the configured page geometry
    #[arg(long, value_enum)]
    pub paper: Option<Paper>,

    /// Output PDF path
    #[arg(short, long)]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Report record (JSON)
    #[arg(short, long)]
    pub record: PathBuf,

    /// Original document, checked against the record's integrity hash
    #[arg(short, long)]
    pub document: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paper {
    A4,
    A5,
    Letter,
    Legal,
}

impl From<Paper> for PaperSize {
    fn from(paper: Paper) -> Self {
        match paper {
            Paper::A4 => PaperSize::A4,
            Paper::A5 => PaperSize::A5,
            Paper::Letter => PaperSize::Letter,
            Paper::Legal => PaperSize::Legal,
        }
    }
}
