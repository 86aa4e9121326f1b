//! Run summary and reporting
//!
//! This module defines structures for tracking and reporting sync results.

use std::fmt;
use std::time::Duration;

/// Result of one run as seen by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOutcome {
    /// Candidates left after extension filtering
    pub items_found: usize,
    /// Transfers that completed
    pub success_count: usize,
    /// Transfers that failed
    pub failure_count: usize,
    /// Whether the checkpoint was moved to this run's start time
    pub checkpoint_advanced: bool,
}

/// What happened to the checkpoint at the end of a run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckpointStatus {
    /// Not decided yet, or the run stopped before transfers
    #[default]
    Untouched,
    /// Moved to the run's start time
    Advanced(String),
    /// Left unchanged; the reason is human readable
    Held(String),
    /// The decision was to commit but the write failed
    WriteFailed(String),
}

impl CheckpointStatus {
    pub fn is_advanced(&self) -> bool {
        matches!(self, CheckpointStatus::Advanced(_))
    }
}

impl fmt::Display for CheckpointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckpointStatus::Untouched => f.write_str("untouched"),
            CheckpointStatus::Advanced(ts) => write!(f, "advanced to {ts}"),
            CheckpointStatus::Held(reason) => write!(f, "held ({reason})"),
            CheckpointStatus::WriteFailed(err) => write!(f, "write failed ({err})"),
        }
    }
}

/// Per-item failure with its URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferFailure {
    pub url: String,
    pub cause: String,
}

/// Summary of a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    /// Catalog records returned by the search
    pub granules_found: usize,

    /// Candidates after extension filtering
    pub candidates: usize,

    /// Number of successful transfers
    pub successes: usize,

    /// Number of failed transfers
    pub failures: usize,

    /// Candidates never started because of a shutdown request
    pub skipped: usize,

    /// Bytes written to the destination
    pub bytes_transferred: u64,

    /// Search window, for display
    pub window: String,

    /// Duration of the run
    pub duration: Duration,

    /// Checkpoint decision
    pub checkpoint: CheckpointStatus,

    /// Failures encountered during transfers
    pub errors: Vec<TransferFailure>,

    /// Targets a dry run would have written
    pub planned: Vec<String>,

    pub dry_run: bool,

    /// A shutdown request stopped the run early
    pub interrupted: bool,
}

impl SyncSummary {
    /// Create a new empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Check if the run was successful (no failures and not interrupted)
    pub fn is_successful(&self) -> bool {
        self.failures == 0 && !self.interrupted
    }

    /// The caller-facing outcome
    pub fn outcome(&self) -> RunOutcome {
        RunOutcome {
            items_found: self.candidates,
            success_count: self.successes,
            failure_count: self.failures,
            checkpoint_advanced: self.checkpoint.is_advanced(),
        }
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            window = %self.window,
            granules_found = self.granules_found,
            candidates = self.candidates,
            successful = self.successes,
            failed = self.failures,
            skipped = self.skipped,
            bytes = self.bytes_transferred,
            duration_secs = self.duration.as_secs(),
            checkpoint = %self.checkpoint,
            dry_run = self.dry_run,
            "Sync completed"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Sync completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(url = %error.url, cause = %error.cause, "Transfer failed");
            }
        }

        if self.interrupted {
            tracing::warn!(skipped = self.skipped, "Sync interrupted by shutdown request");
        }
    }
}
