//! Transfer orchestration
//!
//! This module runs the transfer of every filtered candidate, isolating
//! per-item failures and folding results into a [`TransferAccumulator`].

use super::hooks::PostProcessHook;
use super::summary::TransferFailure;
use crate::adapters::destination::traits::{Destination, Transfer, TransferTarget};
use crate::core::layout::OutputResolver;
use crate::domain::{Candidate, Result};
use crate::{log_transfer_failure, log_transfer_success};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Outcome of a single candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferResult {
    /// Written to the destination
    Succeeded {
        target: String,
        bytes: u64,
        duration: Duration,
    },
    /// Any error between resolving the target and finishing the write
    Failed { cause: String },
}

/// Counters and failures of the transfer phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferAccumulator {
    pub success_count: usize,
    pub failure_count: usize,
    /// Candidates never started because of a shutdown request
    pub skipped: usize,
    pub bytes: u64,
    pub failures: Vec<TransferFailure>,
    /// A shutdown request was seen during the phase
    pub interrupted: bool,
}

impl TransferAccumulator {
    /// Fold one result in
    pub fn record(&mut self, url: &str, result: TransferResult) {
        match result {
            TransferResult::Succeeded { bytes, .. } => {
                self.success_count += 1;
                self.bytes += bytes;
            }
            TransferResult::Failed { cause } => {
                self.failure_count += 1;
                self.failures.push(TransferFailure {
                    url: url.to_string(),
                    cause,
                });
            }
        }
    }

    /// Candidates that reached a success or failure
    pub fn attempted(&self) -> usize {
        self.success_count + self.failure_count
    }
}

/// A dry-run target for one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTransfer {
    pub url: String,
    pub target: std::result::Result<TransferTarget, String>,
}

/// Runs transfers for one sync run
pub struct TransferOrchestrator {
    resolver: OutputResolver,
    destination: Arc<dyn Destination + Send + Sync>,
    transfer: Arc<dyn Transfer + Send + Sync>,
    hooks: Vec<Arc<dyn PostProcessHook>>,
    concurrency: usize,
    shutdown: Option<watch::Receiver<bool>>,
}

impl TransferOrchestrator {
    pub fn new(
        resolver: OutputResolver,
        destination: Arc<dyn Destination + Send + Sync>,
        transfer: Arc<dyn Transfer + Send + Sync>,
    ) -> Self {
        Self {
            resolver,
            destination,
            transfer,
            hooks: Vec::new(),
            concurrency: 1,
            shutdown: None,
        }
    }

    /// Hooks run, in order, on every local file that was written
    pub fn with_hooks(mut self, hooks: Vec<Arc<dyn PostProcessHook>>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Number of transfers in flight at once, at least 1
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Stop starting transfers once the channel reads `true`
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Transfer every candidate
    ///
    /// Results are folded in candidate order. A failed item never stops the
    /// items after it; a shutdown request does, leaving them counted as
    /// skipped.
    pub async fn run(&self, candidates: &[Candidate]) -> TransferAccumulator {
        let mut acc = TransferAccumulator::default();

        tracing::info!(
            candidates = candidates.len(),
            concurrency = self.concurrency,
            layout = %self.resolver.kind(),
            "Starting transfers"
        );

        let mut results = stream::iter(candidates)
            .map(|candidate| async move { (candidate, self.process(candidate).await) })
            .buffered(self.concurrency);

        while let Some((candidate, result)) = results.next().await {
            match result {
                Some(result) => acc.record(&candidate.url, result),
                None => acc.skipped += 1,
            }
        }

        acc.interrupted = self.is_shutdown();
        acc
    }

    /// Resolve every candidate's target without side effects
    pub fn plan(&self, candidates: &[Candidate]) -> Vec<PlannedTransfer> {
        candidates
            .iter()
            .map(|candidate| PlannedTransfer {
                url: candidate.url.clone(),
                target: self
                    .resolver
                    .resolve(&candidate.url)
                    .map(|relative| self.destination.plan(&relative))
                    .map_err(|e| e.to_string()),
            })
            .collect()
    }

    fn prepare(&self, candidate: &Candidate) -> Result<TransferTarget> {
        let relative = self.resolver.resolve(&candidate.url)?;
        self.destination.prepare(&relative)
    }

    /// `None` when the candidate was skipped because of shutdown
    async fn process(&self, candidate: &Candidate) -> Option<TransferResult> {
        if self.is_shutdown() {
            tracing::debug!(url = %candidate.url, "Shutdown requested, skipping transfer");
            return None;
        }

        let started = Instant::now();

        let target = match self.prepare(candidate) {
            Ok(target) => target,
            Err(e) => {
                log_transfer_failure!(candidate.url, "output_path", e);
                return Some(TransferResult::Failed {
                    cause: e.to_string(),
                });
            }
        };

        match self.transfer.transfer(&candidate.url, &target).await {
            Ok(bytes) => {
                let duration = started.elapsed();
                log_transfer_success!(candidate.url, target, bytes, duration);
                self.run_hooks(&target).await;
                Some(TransferResult::Succeeded {
                    target: target.to_string(),
                    bytes,
                    duration,
                })
            }
            Err(e) => {
                log_transfer_failure!(candidate.url, e.cause_kind(), e);
                Some(TransferResult::Failed {
                    cause: e.to_string(),
                })
            }
        }
    }

    async fn run_hooks(&self, target: &TransferTarget) {
        let Some(path) = target.local_path() else {
            if !self.hooks.is_empty() {
                tracing::debug!(target = %target, "Process commands only run on local files");
            }
            return;
        };

        for hook in &self.hooks {
            if let Err(e) = hook.invoke(path).await {
                tracing::warn!(
                    command = %hook.describe(),
                    path = %path.display(),
                    error = %e,
                    "Process command failed"
                );
            }
        }
    }
}
