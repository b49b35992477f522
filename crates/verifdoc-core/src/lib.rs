// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// VerifDoc: Core types, errors, and configuration shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod integrity;
pub mod record;
pub mod types;

pub use config::{EmbedderConfig, EngineConfig, FusionConfig, OrchestratorConfig, PageConfig};
pub use error::{Result, VerifdocError};
pub use record::*;
pub use types::*;
