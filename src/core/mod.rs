//! Core business logic for granule-sync.
//!
//! # Modules
//!
//! - [`state`] - Checkpoint timestamp and its persistence
//! - [`search`] - Query construction, result extraction and extension filtering
//! - [`layout`] - Output path resolution
//! - [`sync`] - Transfer orchestration, commit decision and run coordination
//!
//! # Sync Workflow
//!
//! 1. **Load State**: Read the checkpoint from the destination
//! 2. **Query CMR**: Search granules updated since the checkpoint, or in an explicit range
//! 3. **Extract**: Flatten records into data and metadata candidates
//! 4. **Filter**: Keep candidates with a configured extension
//! 5. **Transfer**: Download or upload each candidate, isolating failures
//! 6. **Commit**: Advance the checkpoint only if nothing failed
//! 7. **Report**: Generate the run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use granule_sync::config::load_config;
//! use granule_sync::core::sync::SyncCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("granule-sync.toml")?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = SyncCoordinator::new(config, shutdown_rx).await?;
//!
//! let summary = coordinator.execute().await?;
//! println!("Found: {}", summary.candidates);
//! println!("Successful: {}", summary.successes);
//! println!("Failed: {}", summary.failures);
//! # Ok(())
//! # }
//! ```

pub mod layout;
pub mod search;
pub mod state;
pub mod sync;
