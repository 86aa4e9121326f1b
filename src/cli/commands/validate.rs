//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the granule-sync configuration file.

use crate::adapters::destination::check_destination_supported;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let Some(config_path) = config_path else {
            println!("❌ No configuration file given; use --config or GRANULE_SYNC_CONFIG");
            return Ok(2);
        };

        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as well
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(2);
            }
        };

        if let Err(e) = check_destination_supported(config.output.destination) {
            println!("❌ {e}");
            return Ok(2);
        }

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Collection: {}", config.search.collection);
        println!("  Provider: {}", config.search.provider);
        println!("  Bounding Box: {}", config.search.bounding_box);
        match (&config.search.start_date, &config.search.end_date) {
            (None, None) => println!("  Window: updated since checkpoint ({} minutes on first run)", config.search.minutes),
            (start, end) => println!(
                "  Window: temporal {} to {}",
                start.as_deref().unwrap_or("(open)"),
                end.as_deref().unwrap_or("(now)")
            ),
        }
        println!("  Extensions: {:?}", config.search.extensions);
        println!("  CMR: {}", config.cmr.search_url);
        println!(
            "  Earthdata User: {}",
            config.earthdata.username.as_deref().unwrap_or("(anonymous)")
        );
        println!("  Destination: {:?} {}", config.output.destination, config.output.path);
        println!("  Layout: {}", config.output.layout);
        println!("  Concurrency: {}", config.transfer.concurrency);
        println!();
        Ok(0)
    }
}
