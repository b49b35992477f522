// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// verifdoc-analysis: runs the registered forensic modules against an upload,
// fuses their scores into one verdict, and assembles the report record.

pub mod analyzer;
pub mod cancel;
pub mod fusion;
pub mod module;
pub mod orchestrator;

pub use analyzer::Analyzer;
pub use cancel::{CancelToken, Cancellation};
pub use fusion::FusionEngine;
pub use module::{AnalysisModule, ModuleOutput};
pub use orchestrator::Orchestrator;
