//! Destination abstraction traits
//!
//! This module defines the traits that destination backends implement:
//! checkpoint persistence, target preparation, and the transfer itself.

use crate::core::layout::RelativeTarget;
use crate::core::state::Checkpoint;
use crate::domain::{Result, TransferError};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

/// Name of the checkpoint file or object
pub const CHECKPOINT_NAME: &str = ".update";

/// Where a single granule is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferTarget {
    /// A file on the local filesystem
    Local(PathBuf),
    /// An object in a bucket
    Object { bucket: String, key: String },
}

impl TransferTarget {
    /// The local path, for local targets
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            TransferTarget::Local(path) => Some(path),
            TransferTarget::Object { .. } => None,
        }
    }
}

impl fmt::Display for TransferTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferTarget::Local(path) => write!(f, "{}", path.display()),
            TransferTarget::Object { bucket, key } => write!(f, "s3://{bucket}/{key}"),
        }
    }
}

/// Checkpoint persistence for one destination
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the checkpoint
    ///
    /// Returns `Ok(None)` if none has been written yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint exists but cannot be read or parsed.
    async fn load(&self) -> Result<Option<Checkpoint>>;

    /// Replace the checkpoint
    ///
    /// A failed save must leave the previous checkpoint readable.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn save(&self, checkpoint: &Checkpoint) -> Result<()>;

    /// Human-readable checkpoint location
    fn location(&self) -> String;
}

/// Maps relative targets onto a concrete destination
pub trait Destination: Send + Sync {
    /// The target for a relative path, without side effects
    fn plan(&self, target: &RelativeTarget) -> TransferTarget;

    /// The target for a relative path, creating parent directories if needed
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created.
    fn prepare(&self, target: &RelativeTarget) -> Result<TransferTarget>;

    /// Human-readable destination root
    fn location(&self) -> String;
}

/// Moves one remote file to a prepared target
#[async_trait]
pub trait Transfer: Send + Sync {
    /// Transfer `url` to `target`, returning the number of bytes written
    ///
    /// # Errors
    ///
    /// Every failure is a per-item [`TransferError`].
    async fn transfer(
        &self,
        url: &str,
        target: &TransferTarget,
    ) -> std::result::Result<u64, TransferError>;
}
