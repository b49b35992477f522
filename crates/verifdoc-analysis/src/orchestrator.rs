// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Module orchestrator: runs every registered analysis module against one
// document, concurrently and each under its own timeout.
//
// Failure of one module (error, panic, timeout, cancellation) is captured as
// a `ModuleResult { success: false }` in that module's slot and never
// touches its siblings. `run_all` returns only once every module has settled.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use verifdoc_core::config::OrchestratorConfig;
use verifdoc_core::error::{Result, VerifdocError};
use verifdoc_core::types::{ModuleId, ModuleResult, ModuleResults};

use crate::cancel::CancelToken;
use crate::module::AnalysisModule;

/// Runs a fixed, ordered set of analysis modules.
pub struct Orchestrator {
    modules: Vec<Arc<dyn AnalysisModule>>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            modules: Vec::new(),
            config,
        }
    }

    /// Register a module. Registration order is the order results (and
    /// fusion indicators) are reported in.
    pub fn register(&mut self, module: Arc<dyn AnalysisModule>) -> Result<()> {
        let id = module.id();
        if self.modules.iter().any(|m| m.id() == id) {
            return Err(VerifdocError::DuplicateModule(id));
        }
        debug!(module = %id, "module registered");
        self.modules.push(module);
        Ok(())
    }

    /// Builder-style `register`.
    pub fn with_module(mut self, module: Arc<dyn AnalysisModule>) -> Result<Self> {
        self.register(module)?;
        Ok(self)
    }

    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.modules.iter().map(|m| m.id()).collect()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Dispatch every registered module and collect one result per module.
    ///
    /// Each module runs in its own task, gated by a worker limit and wrapped
    /// in an individual timeout. Firing `cancel` ends every module still
    /// running or waiting with a `"cancelled"` failure.
    #[instrument(skip_all, fields(%filename, bytes = document.len(), modules = self.modules.len()))]
    pub async fn run_all(
        &self,
        document: Arc<[u8]>,
        filename: &str,
        cancel: &CancelToken,
    ) -> ModuleResults {
        let workers = Arc::new(Semaphore::new(self.config.worker_limit()));
        let timeout = self.config.module_timeout();
        let filename: Arc<str> = Arc::from(filename);
        let started = Instant::now();

        info!(
            workers = self.config.worker_limit(),
            timeout_ms = timeout.as_millis() as u64,
            "dispatching analysis modules"
        );

        let mut tasks = ModuleTasks(Vec::with_capacity(self.modules.len()));
        for module in &self.modules {
            let id = module.id();
            let module = Arc::clone(module);
            let document = Arc::clone(&document);
            let filename = Arc::clone(&filename);
            let workers = Arc::clone(&workers);
            let cancel = cancel.clone();

            let handle = tokio::spawn(async move {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        warn!(module = %id, "module cancelled");
                        ModuleResult::failure(id, "cancelled")
                    }
                    result = run_module(module, &document, &filename, &workers, timeout) => result,
                }
            });
            tasks.0.push((id, handle));
        }

        // Slots are filled only after every task has settled, in
        // registration order.
        let mut results = ModuleResults::new();
        for (id, handle) in tasks.0.iter_mut() {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) if join_err.is_panic() => {
                    warn!(module = %id, "module panicked");
                    ModuleResult::failure(*id, "module panicked")
                }
                Err(_) => ModuleResult::failure(*id, "cancelled"),
            };
            results.insert(result);
        }

        let failed = results.failed_modules();
        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            succeeded = results.len() - failed.len(),
            failed = failed.len(),
            "analysis modules settled"
        );
        results
    }
}

/// Spawned module tasks; aborts any still running if `run_all` is dropped.
struct ModuleTasks(Vec<(ModuleId, JoinHandle<ModuleResult>)>);

impl Drop for ModuleTasks {
    fn drop(&mut self) {
        for (_, handle) in &self.0 {
            handle.abort();
        }
    }
}

/// Run one module once a worker slot is free, under its timeout.
async fn run_module(
    module: Arc<dyn AnalysisModule>,
    document: &[u8],
    filename: &str,
    workers: &Semaphore,
    timeout: Duration,
) -> ModuleResult {
    let id = module.id();
    let Ok(_permit) = workers.acquire().await else {
        return ModuleResult::failure(id, "worker pool closed");
    };

    let started = Instant::now();
    match tokio::time::timeout(timeout, module.run(document, filename)).await {
        Ok(Ok(output)) => {
            let result = output.into_result(id);
            match result.score {
                Some(score) => debug!(
                    module = %id,
                    score,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "module completed"
                ),
                None => warn!(module = %id, reason = ?result.error_reason, "module output rejected"),
            }
            result
        }
        Ok(Err(err)) => {
            let reason = match err {
                VerifdocError::ModuleFailure { reason, .. } => reason,
                other => other.to_string(),
            };
            warn!(module = %id, %reason, "module failed");
            ModuleResult::failure(id, reason)
        }
        Err(_) => {
            warn!(module = %id, timeout_ms = timeout.as_millis() as u64, "module timed out");
            ModuleResult::failure(id, format!("timed out after {} ms", timeout.as_millis()))
        }
    }
}
