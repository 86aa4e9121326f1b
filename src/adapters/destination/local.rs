//! Local directory destination
//!
//! Granules are written below the destination root and the checkpoint lives
//! at `<root>/.update`.

use super::traits::{CheckpointStore, Destination, TransferTarget, CHECKPOINT_NAME};
use crate::core::layout::RelativeTarget;
use crate::core::state::Checkpoint;
use crate::domain::{Result, SyncError};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A destination directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    root: PathBuf,
}

impl LocalDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the checkpoint file
    pub fn checkpoint_path(&self) -> PathBuf {
        self.root.join(CHECKPOINT_NAME)
    }
}

/// Replace `path` with `contents` so a crash leaves either the old or the new file
fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    // Make the rename durable
    #[cfg(unix)]
    std::fs::File::open(parent)?.sync_all()?;

    Ok(())
}

#[async_trait]
impl CheckpointStore for LocalDirectory {
    async fn load(&self) -> Result<Option<Checkpoint>> {
        let path = self.checkpoint_path();
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Checkpoint::parse(&text).map(Some).map_err(|e| {
                SyncError::State(format!("Corrupt checkpoint at {}: {e}", path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SyncError::State(format!(
                "Failed to read checkpoint {}: {e}",
                path.display()
            ))),
        }
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        let path = self.checkpoint_path();
        let contents = checkpoint.to_string();
        let target = path.clone();

        tokio::task::spawn_blocking(move || write_atomic(&target, contents.as_bytes()))
            .await
            .map_err(|e| SyncError::State(format!("Checkpoint write task failed: {e}")))?
            .map_err(|e| {
                SyncError::State(format!(
                    "Failed to write checkpoint {}: {e}",
                    path.display()
                ))
            })
    }

    fn location(&self) -> String {
        self.checkpoint_path().display().to_string()
    }
}

impl Destination for LocalDirectory {
    fn plan(&self, target: &RelativeTarget) -> TransferTarget {
        let mut path = self.root.clone();
        for component in target.components() {
            path.push(component);
        }
        TransferTarget::Local(path)
    }

    fn prepare(&self, target: &RelativeTarget) -> Result<TransferTarget> {
        let planned = self.plan(target);
        if let Some(parent) = planned.local_path().and_then(Path::parent) {
            std::fs::create_dir_all(parent).map_err(|e| {
                SyncError::Io(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        Ok(planned)
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}
