//! State manager for checkpoint persistence
//!
//! This module provides the StateManager for loading and saving the
//! destination checkpoint through a [`CheckpointStore`] backend.

use crate::adapters::destination::traits::CheckpointStore;
use crate::core::state::checkpoint::Checkpoint;
use crate::domain::Result;
use std::sync::Arc;

/// State manager for checkpoint persistence
///
/// One manager owns the checkpoint of one destination (a directory or a
/// bucket prefix).
pub struct StateManager {
    /// Checkpoint storage backend
    store: Arc<dyn CheckpointStore + Send + Sync>,
}

impl StateManager {
    /// Create a new StateManager with a checkpoint storage backend
    pub fn new_with_store(store: Arc<dyn CheckpointStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// Load the stored checkpoint
    ///
    /// Returns `Ok(None)` when the destination has never been committed.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<Option<Checkpoint>> {
        self.store.load().await
    }

    /// Load the stored checkpoint, falling back to `default` on a first run
    ///
    /// # Errors
    ///
    /// A corrupt checkpoint is returned as an error rather than replaced.
    pub async fn load_or_default(&self, default: Checkpoint) -> Result<Checkpoint> {
        match self.store.load().await? {
            Some(checkpoint) => {
                tracing::info!(
                    location = %self.store.location(),
                    checkpoint = %checkpoint,
                    "Checkpoint found (the last run was at {checkpoint})"
                );
                Ok(checkpoint)
            }
            None => {
                tracing::info!(
                    location = %self.store.location(),
                    default = %default,
                    "No checkpoint in the destination (is this the first run?)"
                );
                Ok(default)
            }
        }
    }

    /// Save a checkpoint, replacing the previous one atomically
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        tracing::info!(
            location = %self.store.location(),
            checkpoint = %checkpoint,
            "Committing checkpoint"
        );
        self.store.save(checkpoint).await
    }

    /// Where the checkpoint lives, for display
    pub fn location(&self) -> String {
        self.store.location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SyncError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Stores the checkpoint text in memory
    struct MemoryStore {
        text: Mutex<Option<String>>,
    }

    impl MemoryStore {
        fn with(text: Option<&str>) -> Self {
            Self {
                text: Mutex::new(text.map(str::to_string)),
            }
        }
    }

    #[async_trait]
    impl CheckpointStore for MemoryStore {
        async fn load(&self) -> Result<Option<Checkpoint>> {
            let text = self.text.lock().unwrap().clone();
            text.as_deref().map(Checkpoint::parse).transpose()
        }

        async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
            *self.text.lock().unwrap() = Some(checkpoint.to_string());
            Ok(())
        }

        fn location(&self) -> String {
            "memory".to_string()
        }
    }

    #[tokio::test]
    async fn test_load_or_default_first_run() {
        let manager = StateManager::new_with_store(Arc::new(MemoryStore::with(None)));
        let default = Checkpoint::parse("2021-01-01T00:00:00Z").unwrap();
        assert_eq!(manager.load_or_default(default).await.unwrap(), default);
    }

    #[tokio::test]
    async fn test_load_or_default_existing() {
        let manager = StateManager::new_with_store(Arc::new(MemoryStore::with(Some(
            "2021-06-01T08:00:00Z",
        ))));
        let default = Checkpoint::parse("2021-01-01T00:00:00Z").unwrap();
        let loaded = manager.load_or_default(default).await.unwrap();
        assert_eq!(loaded.to_string(), "2021-06-01T08:00:00Z");
    }

    #[tokio::test]
    async fn test_corrupt_checkpoint_is_fatal() {
        let manager =
            StateManager::new_with_store(Arc::new(MemoryStore::with(Some("not a timestamp"))));
        let default = Checkpoint::parse("2021-01-01T00:00:00Z").unwrap();
        let err = manager.load_or_default(default).await.unwrap_err();
        assert!(matches!(err, SyncError::State(_)));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let manager = StateManager::new_with_store(Arc::new(MemoryStore::with(None)));
        let checkpoint = Checkpoint::parse("2022-02-02T02:02:02Z").unwrap();
        manager.save(&checkpoint).await.unwrap();
        assert_eq!(manager.load().await.unwrap(), Some(checkpoint));
    }
}
