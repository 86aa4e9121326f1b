//! Status command implementation
//!
//! This module implements the `status` command for displaying the
//! destination checkpoint.

use super::load_optional;
use crate::adapters::destination::create_destination;
use crate::adapters::earthdata::EarthdataSession;
use crate::config::DestinationKind;
use crate::core::state::StateManager;
use clap::Args;
use std::time::Duration;

/// Arguments for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Destination directory, or bucket when --s3 is set
    #[arg(short = 'd', long)]
    pub data_dir: Option<String>,

    /// The destination is an S3 bucket
    #[arg(long)]
    pub s3: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        tracing::info!("Checking sync status");

        println!("📊 Sync Status");
        println!();

        let mut config = match load_optional(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        if let Some(dir) = &self.data_dir {
            config.output.path = dir.clone();
        }
        if self.s3 {
            config.output.destination = DestinationKind::S3;
        }
        if config.output.path.trim().is_empty() {
            println!("❌ No destination given; use --data-dir or set output.path");
            return Ok(2);
        }

        let handles = match EarthdataSession::new(&config.earthdata, None, Duration::from_secs(30))
        {
            Ok(session) => create_destination(&config.output, session).await,
            Err(e) => Err(e),
        };
        let handles = match handles {
            Ok(h) => h,
            Err(e) => {
                println!("❌ Failed to open destination");
                println!("   Error: {e}");
                return Ok(if e.is_configuration() { 2 } else { 4 });
            }
        };

        let state_manager = StateManager::new_with_store(handles.store);

        match state_manager.load().await {
            Ok(Some(checkpoint)) => {
                println!("Checkpoint: {}", state_manager.location());
                println!("Last successful run: {checkpoint}");
                println!();
                println!("The next run searches granules updated since {checkpoint}.");
                Ok(0)
            }
            Ok(None) => {
                println!("No checkpoint found at {}.", state_manager.location());
                println!(
                    "The next run searches the last {} minutes.",
                    config.search.minutes
                );
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to load checkpoint");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }
}
