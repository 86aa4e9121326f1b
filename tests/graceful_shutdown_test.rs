//! Integration tests for graceful shutdown
//!
//! These tests verify that:
//! - Shutdown signals reach every receiver
//! - Transfers in flight finish, later ones are skipped
//! - An interrupted run never moves the checkpoint

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use granule_sync::adapters::destination::{LocalDirectory, Transfer, TransferTarget};
use granule_sync::core::layout::{AttributeTables, LayoutKind, OutputResolver};
use granule_sync::core::state::{Checkpoint, StateManager};
use granule_sync::core::sync::{
    CheckpointCommit, CheckpointStatus, CommitDecision, HoldReason, TransferOrchestrator,
};
use granule_sync::domain::{Candidate, LinkKind, NativeId, TransferError};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::watch;

/// Requests shutdown from inside the first transfer, like a signal arriving mid-run
struct SignallingTransfer {
    shutdown: watch::Sender<bool>,
    seen: Mutex<Vec<String>>,
}

#[async_trait]
impl Transfer for SignallingTransfer {
    async fn transfer(&self, url: &str, target: &TransferTarget) -> Result<u64, TransferError> {
        self.seen.lock().unwrap().push(url.to_string());
        let _ = self.shutdown.send(true);
        std::fs::write(target.local_path().unwrap(), b"data").unwrap();
        Ok(4)
    }
}

fn candidates(n: usize) -> Vec<Candidate> {
    (0..n)
        .map(|i| {
            Candidate::new(
                format!("https://archive.example.com/g{i}.nc"),
                NativeId::new(format!("g{i}")),
                LinkKind::Data,
            )
        })
        .collect()
}

#[tokio::test]
async fn test_shutdown_signal_propagation() {
    let (shutdown_tx, shutdown_rx1) = watch::channel(false);
    let shutdown_rx2 = shutdown_rx1.clone();

    assert!(!*shutdown_rx1.borrow());
    assert!(!*shutdown_rx2.borrow());

    shutdown_tx.send(true).unwrap();

    assert!(*shutdown_rx1.borrow());
    assert!(*shutdown_rx2.borrow());
}

#[tokio::test]
async fn test_in_flight_transfer_completes_and_rest_are_skipped() {
    let dir = TempDir::new().unwrap();
    let (tx, rx) = watch::channel(false);
    let transfer = Arc::new(SignallingTransfer {
        shutdown: tx,
        seen: Mutex::new(Vec::new()),
    });
    let resolver = OutputResolver::new(LayoutKind::Flat, 0, AttributeTables::default());
    let orchestrator = TransferOrchestrator::new(
        resolver,
        Arc::new(LocalDirectory::new(dir.path())),
        transfer.clone(),
    )
    .with_shutdown(rx);

    let acc = orchestrator.run(&candidates(3)).await;

    assert_eq!(transfer.seen.lock().unwrap().len(), 1);
    assert_eq!(acc.success_count, 1);
    assert_eq!(acc.skipped, 2);
    assert!(acc.interrupted);
    // The finished file is complete, nothing else was started
    assert_eq!(std::fs::read(dir.path().join("g0.nc")).unwrap(), b"data");
    assert!(!dir.path().join("g1.nc").exists());
}

#[tokio::test]
async fn test_interrupted_run_holds_checkpoint() {
    let dir = TempDir::new().unwrap();
    let local = Arc::new(LocalDirectory::new(dir.path()));
    let state = StateManager::new_with_store(local.clone());
    let previous = Checkpoint::parse("2021-03-01T00:00:00Z").unwrap();
    state.save(&previous).await.unwrap();

    let (tx, rx) = watch::channel(false);
    let transfer = Arc::new(SignallingTransfer {
        shutdown: tx,
        seen: Mutex::new(Vec::new()),
    });
    let resolver = OutputResolver::new(LayoutKind::Flat, 0, AttributeTables::default());
    let acc = TransferOrchestrator::new(resolver, local, transfer)
        .with_shutdown(rx)
        .run(&candidates(2))
        .await;

    let now = Utc.with_ymd_and_hms(2021, 3, 10, 6, 0, 0).unwrap();
    let decision = CheckpointCommit::provisional(now).decide(&acc);
    assert_eq!(decision, CommitDecision::Held(HoldReason::Interrupted));

    let status = decision.apply(&state).await;
    assert_eq!(status, CheckpointStatus::Held("interrupted".to_string()));
    assert_eq!(state.load().await.unwrap(), Some(previous));
}

#[tokio::test]
async fn test_resume_after_interruption_searches_same_window() {
    let dir = TempDir::new().unwrap();
    let state = StateManager::new_with_store(Arc::new(LocalDirectory::new(dir.path())));
    let previous = Checkpoint::parse("2021-03-01T00:00:00Z").unwrap();
    state.save(&previous).await.unwrap();

    // Interrupted run: nothing committed
    let now = Utc.with_ymd_and_hms(2021, 3, 10, 6, 0, 0).unwrap();
    let interrupted = granule_sync::core::sync::TransferAccumulator {
        interrupted: true,
        ..Default::default()
    };
    CheckpointCommit::provisional(now)
        .decide(&interrupted)
        .apply(&state)
        .await;

    // The next run starts from the same checkpoint
    let default = Checkpoint::window_default(now, 60);
    assert_eq!(state.load_or_default(default).await.unwrap(), previous);
}
