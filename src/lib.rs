// Granule Sync - Incremental CMR Granule Subscriber
// Copyright (c) 2025 Granule Sync Contributors
// Licensed under the MIT License

//! # Granule Sync - Incremental CMR Granule Subscriber
//!
//! Granule Sync finds granules newly added to a CMR collection and copies their
//! data files to a local directory or an S3 bucket. Each destination keeps a
//! checkpoint so the next run only asks for what changed since the last fully
//! successful one.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (checkpoint, search, layout, sync)
//! - [`adapters`] - External integrations (CMR, Earthdata, destinations)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use granule_sync::config::load_config;
//! use granule_sync::core::sync::SyncCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("granule-sync.toml")?;
//!     let (_tx, shutdown) = tokio::sync::watch::channel(false);
//!
//!     let coordinator = SyncCoordinator::new(config, shutdown).await?;
//!     let summary = coordinator.execute().await?;
//!
//!     println!("Transferred {} files", summary.successes);
//!     Ok(())
//! }
//! ```
//!
//! ## Incremental Sync
//!
//! The checkpoint is a single `YYYY-MM-DDTHH:MM:SSZ` timestamp stored as
//! `.update` at the destination root. It moves to the run's start time only
//! when every selected file transferred; otherwise the next run searches the
//! same window again.
//!
//! ```rust
//! use granule_sync::core::state::Checkpoint;
//!
//! let checkpoint = Checkpoint::parse("2021-03-05T00:00:00Z").unwrap();
//! assert_eq!(checkpoint.to_string(), "2021-03-05T00:00:00Z");
//! ```
//!
//! ## Output Layouts
//!
//! Files land directly under the destination, or in `YYYY/DDD`,
//! `YYYY/MM/DD`, `YYYY` or `cNNNN` directories derived from the granule's
//! start time or cycle number. See [`core::layout`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
