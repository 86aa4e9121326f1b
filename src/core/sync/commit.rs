//! Checkpoint commit decision
//!
//! The checkpoint only moves once every transfer has resolved and none
//! failed. [`CheckpointCommit`] starts provisional with the run's start
//! time; [`CheckpointCommit::decide`] consumes it, so a decision cannot be
//! taken twice or before the accumulator exists.

use super::batch::TransferAccumulator;
use super::summary::CheckpointStatus;
use crate::core::state::{Checkpoint, StateManager};
use chrono::{DateTime, Utc};
use std::fmt;

/// A provisional checkpoint for the current run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointCommit {
    candidate: Checkpoint,
    dry_run: bool,
}

/// Why the checkpoint was not moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldReason {
    Failures(usize),
    Interrupted,
    DryRun,
}

impl fmt::Display for HoldReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoldReason::Failures(1) => f.write_str("1 failed transfer"),
            HoldReason::Failures(n) => write!(f, "{n} failed transfers"),
            HoldReason::Interrupted => f.write_str("interrupted"),
            HoldReason::DryRun => f.write_str("dry run"),
        }
    }
}

/// Result of [`CheckpointCommit::decide`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitDecision {
    Committed(Checkpoint),
    Held(HoldReason),
}

impl CheckpointCommit {
    /// Provisional checkpoint at the run's captured start time
    pub fn provisional(now: DateTime<Utc>) -> Self {
        Self {
            candidate: Checkpoint::new(now),
            dry_run: false,
        }
    }

    /// Never commit, whatever the transfers did
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn candidate(&self) -> Checkpoint {
        self.candidate
    }

    /// Decide once every transfer has resolved
    ///
    /// Zero candidates with zero failures commits.
    pub fn decide(self, acc: &TransferAccumulator) -> CommitDecision {
        if self.dry_run {
            CommitDecision::Held(HoldReason::DryRun)
        } else if acc.interrupted {
            CommitDecision::Held(HoldReason::Interrupted)
        } else if acc.failure_count > 0 {
            CommitDecision::Held(HoldReason::Failures(acc.failure_count))
        } else {
            CommitDecision::Committed(self.candidate)
        }
    }
}

impl CommitDecision {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitDecision::Committed(_))
    }

    /// Persist a committed decision
    ///
    /// A failed write is logged as a warning and reported as
    /// [`CheckpointStatus::WriteFailed`]; it never fails the run.
    pub async fn apply(self, state: &StateManager) -> CheckpointStatus {
        match self {
            CommitDecision::Committed(checkpoint) => match state.save(&checkpoint).await {
                Ok(()) => CheckpointStatus::Advanced(checkpoint.to_string()),
                Err(e) => {
                    tracing::warn!(
                        location = %state.location(),
                        error = %e,
                        "Failed to write checkpoint; the next run will search the same window again"
                    );
                    CheckpointStatus::WriteFailed(e.to_string())
                }
            },
            CommitDecision::Held(reason) => {
                tracing::info!(
                    location = %state.location(),
                    reason = %reason,
                    "Checkpoint held"
                );
                CheckpointStatus::Held(reason.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::destination::local::LocalDirectory;
    use chrono::TimeZone;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 5, 12, 30, 15).unwrap()
    }

    #[test]
    fn test_commits_without_failures() {
        let acc = TransferAccumulator {
            success_count: 3,
            ..Default::default()
        };
        let decision = CheckpointCommit::provisional(now()).decide(&acc);
        assert_eq!(decision, CommitDecision::Committed(Checkpoint::new(now())));
    }

    #[test]
    fn test_zero_items_commits() {
        let decision = CheckpointCommit::provisional(now()).decide(&TransferAccumulator::default());
        assert!(decision.is_committed());
    }

    #[test]
    fn test_any_failure_holds() {
        let acc = TransferAccumulator {
            success_count: 9,
            failure_count: 1,
            ..Default::default()
        };
        let decision = CheckpointCommit::provisional(now()).decide(&acc);
        assert_eq!(decision, CommitDecision::Held(HoldReason::Failures(1)));
    }

    #[test]
    fn test_interrupt_and_dry_run_hold() {
        let interrupted = TransferAccumulator {
            interrupted: true,
            ..Default::default()
        };
        assert_eq!(
            CheckpointCommit::provisional(now()).decide(&interrupted),
            CommitDecision::Held(HoldReason::Interrupted)
        );
        assert_eq!(
            CheckpointCommit::provisional(now())
                .dry_run(true)
                .decide(&TransferAccumulator::default()),
            CommitDecision::Held(HoldReason::DryRun)
        );
    }

    #[tokio::test]
    async fn test_apply_writes_only_when_committed() {
        let dir = TempDir::new().unwrap();
        let local = Arc::new(LocalDirectory::new(dir.path()));
        let state = StateManager::new_with_store(local.clone());

        let held = CommitDecision::Held(HoldReason::Failures(2)).apply(&state).await;
        assert_eq!(held, CheckpointStatus::Held("2 failed transfers".to_string()));
        assert!(!local.checkpoint_path().exists());

        let status = CommitDecision::Committed(Checkpoint::new(now()))
            .apply(&state)
            .await;
        assert_eq!(status, CheckpointStatus::Advanced("2021-03-05T12:30:15Z".to_string()));
        let text = std::fs::read_to_string(local.checkpoint_path()).unwrap();
        assert_eq!(text.trim_end(), "2021-03-05T12:30:15Z");
    }
}
