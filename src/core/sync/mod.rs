// Sync orchestration: transfers, hooks, commit decision and summary

pub mod batch;
pub mod commit;
pub mod coordinator;
pub mod hooks;
pub mod summary;

pub use batch::{TransferAccumulator, TransferOrchestrator, TransferResult};
pub use commit::{CheckpointCommit, CommitDecision, HoldReason};
pub use coordinator::SyncCoordinator;
pub use hooks::{CommandHook, PostProcessHook};
pub use summary::{CheckpointStatus, RunOutcome, SyncSummary, TransferFailure};
