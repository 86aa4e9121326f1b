//! Sync command implementation
//!
//! This module implements the `sync` command: one incremental run from the
//! catalog to the configured destination.

use super::load_optional;
use crate::config::{validate_config, DestinationKind, SyncConfig};
use crate::core::layout::LayoutFlags;
use crate::core::sync::{SyncCoordinator, SyncSummary};
use crate::domain::{Result, SyncError};
use clap::Args;
use tokio::sync::watch;

/// Failures listed in the printed summary before truncating
const MAX_PRINTED_ERRORS: usize = 10;

/// Arguments for the sync command
#[derive(Args, Debug, Default)]
pub struct SyncArgs {
    /// Collection short name
    #[arg(short = 'c', long)]
    pub collection: Option<String>,

    /// Output directory, or the bucket (with optional prefix) when --s3 is set
    #[arg(short = 'd', long)]
    pub data_dir: Option<String>,

    /// Search start, YYYY-MM-DDTHH:MM:SSZ
    #[arg(long)]
    pub start_date: Option<String>,

    /// Search end, YYYY-MM-DDTHH:MM:SSZ
    #[arg(long)]
    pub end_date: Option<String>,

    /// Bounding box as W,S,E,N
    #[arg(short = 'b', long, allow_hyphen_values = true)]
    pub bounds: Option<String>,

    /// Write into cycle directories (cNNNN)
    #[arg(long = "dc")]
    pub cycle: bool,

    /// Write into year/day-of-year directories
    #[arg(long = "dydoy")]
    pub year_doy: bool,

    /// Write into year/month/day directories
    #[arg(long = "dymd")]
    pub year_month_day: bool,

    /// Write into year directories
    #[arg(long = "dy")]
    pub year: bool,

    /// Hours added to granule start times before picking a date directory
    #[arg(long, allow_negative_numbers = true)]
    pub offset: Option<i64>,

    /// Look-back window in minutes when no checkpoint exists
    #[arg(short = 'm', long)]
    pub minutes: Option<i64>,

    /// File extension to download (repeatable)
    #[arg(short = 'e', long = "extension")]
    pub extensions: Vec<String>,

    /// Command run on every downloaded file (repeatable)
    #[arg(long = "process")]
    pub process: Vec<String>,

    /// CMR provider
    #[arg(short = 'p', long)]
    pub provider: Option<String>,

    /// Upload to S3; --data-dir names the bucket
    #[arg(long)]
    pub s3: bool,

    /// Search and resolve targets without transferring or committing
    #[arg(long)]
    pub dry_run: bool,

    /// Debug logging
    #[arg(long)]
    pub verbose: bool,
}

impl SyncArgs {
    /// Apply command-line flags over the loaded configuration
    ///
    /// # Errors
    ///
    /// Returns a validation error if more than one layout flag is set.
    pub fn apply(&self, config: &mut SyncConfig) -> Result<()> {
        if let Some(layout) = (LayoutFlags {
            cycle: self.cycle,
            year_doy: self.year_doy,
            year_month_day: self.year_month_day,
            year: self.year,
        })
        .select()?
        {
            config.output.layout = layout;
        }

        if let Some(collection) = &self.collection {
            config.search.collection = collection.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.output.path = dir.clone();
        }
        if self.s3 {
            config.output.destination = DestinationKind::S3;
        }
        if let Some(start) = &self.start_date {
            config.search.start_date = Some(start.clone());
        }
        if let Some(end) = &self.end_date {
            config.search.end_date = Some(end.clone());
        }
        if let Some(bounds) = &self.bounds {
            config.search.bounding_box = bounds.clone();
        }
        if let Some(offset) = self.offset {
            config.output.offset_hours = offset;
        }
        if let Some(minutes) = self.minutes {
            config.search.minutes = minutes;
        }
        if !self.extensions.is_empty() {
            config.search.extensions = self.extensions.clone();
        }
        if !self.process.is_empty() {
            config.output.process_commands = self.process.clone();
        }
        if let Some(provider) = &self.provider {
            config.search.provider = provider.clone();
        }
        if self.dry_run {
            config.application.dry_run = true;
        }
        if self.verbose {
            config.application.log_level = "debug".to_string();
        }

        Ok(())
    }

    /// Execute the sync command
    pub async fn execute(
        &self,
        config_path: Option<&str>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting sync command");

        let mut config = match load_optional(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if let Err(e) = self.apply(&mut config).and_then(|_| validate_config(&config)) {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        if config.application.dry_run {
            tracing::info!("Dry run mode enabled - nothing will be transferred");
            println!("🔍 DRY RUN MODE - No files will be transferred and the checkpoint is not moved");
            println!();
        }

        let coordinator = match SyncCoordinator::new(config, shutdown_signal).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create sync coordinator");
                eprintln!("Failed to initialize sync: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let summary = match coordinator.execute().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Sync failed");
                eprintln!("Sync failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        summary.log_summary();
        print_summary(&summary);

        let exit_code = if summary.interrupted {
            println!("⚠️  Sync interrupted. The checkpoint was not moved;");
            println!("   run the same command to retry the window.");
            tracing::info!("Sync interrupted by user signal");
            130
        } else if summary.is_successful() {
            println!("✅ Sync completed successfully!");
            0
        } else {
            println!("⚠️  Sync completed with failures");
            1
        };

        Ok(exit_code)
    }
}

/// Exit code for an error that ended the run
pub fn exit_code_for(error: &SyncError) -> i32 {
    if error.is_configuration() {
        2
    } else if error.is_discovery() {
        4
    } else {
        5
    }
}

fn print_summary(summary: &SyncSummary) {
    println!();
    println!("📊 Sync Summary:");
    println!("  Window: {}", summary.window);
    println!("  Granules Found: {}", summary.granules_found);
    println!("  Files Selected: {}", summary.candidates);
    if summary.dry_run {
        println!("  Planned Transfers: {}", summary.planned.len());
        for target in &summary.planned {
            println!("    - {target}");
        }
    } else {
        println!("  Successful: {}", summary.successes);
        println!("  Failed: {}", summary.failures);
        if summary.skipped > 0 {
            println!("  Skipped: {}", summary.skipped);
        }
        println!("  Bytes: {}", summary.bytes_transferred);
    }
    println!("  Checkpoint: {}", summary.checkpoint);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if !summary.errors.is_empty() {
        println!("⚠️  Errors encountered:");
        for error in summary.errors.iter().take(MAX_PRINTED_ERRORS) {
            println!("  - {}: {}", error.url, error.cause);
        }
        if summary.errors.len() > MAX_PRINTED_ERRORS {
            println!("  ... and {} more", summary.errors.len() - MAX_PRINTED_ERRORS);
        }
        println!();
    }
}
