//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "granule-sync.toml")]
    pub output: String,

    /// Include every option with comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing granule-sync configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            generate_config_with_examples()
        } else {
            generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your collection and destination", self.output);
                println!("  2. Create a .env file with your Earthdata Login credentials:");
                println!("     - Set EARTHDATA_USERNAME and EARTHDATA_PASSWORD");
                println!("  3. Validate configuration: granule-sync -C {} validate-config", self.output);
                println!("  4. Preview a run: granule-sync -C {} sync --dry-run", self.output);
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }
}

/// Minimal configuration
pub fn generate_minimal_config() -> String {
    r#"# granule-sync configuration

[search]
collection = "MUR25-JPL-L4-GLOB-v04.2"
minutes = 60

[earthdata]
username = "${EARTHDATA_USERNAME}"
password = "${EARTHDATA_PASSWORD}"

[output]
path = "./data"
layout = "flat"
"#
    .to_string()
}

/// Configuration with every option and its default
pub fn generate_config_with_examples() -> String {
    r#"# granule-sync configuration
#
# Every value below is the default unless noted. Values of the form ${VAR}
# are read from the environment, and GRANULE_SYNC_<SECTION>_<KEY>
# variables override the file.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Search and resolve targets only; nothing is transferred or committed
dry_run = false

# ============================================================================
# Search
# ============================================================================
[search]
# Collection short name (required)
collection = "MUR25-JPL-L4-GLOB-v04.2"

# CMR provider
provider = "POCLOUD"

# W,S,E,N
bounding_box = "-180,-90,180,90"

# Explicit temporal range, YYYY-MM-DDTHH:MM:SSZ. Setting either bound
# searches by granule time instead of by update time.
# start_date = "2021-01-01T00:00:00Z"
# end_date = "2021-02-01T00:00:00Z"

# Look-back window used when the destination has no checkpoint yet
minutes = 60

# File extensions to download (case-insensitive)
extensions = [".nc", ".h5", ".zip"]

# ============================================================================
# CMR
# ============================================================================
[cmr]
search_url = "https://cmr.earthdata.nasa.gov/search/granules.umm_json"
page_size = 2000
max_pages = 1
timeout_seconds = 60
# token = "${CMR_TOKEN}"

[cmr.retry]
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

# ============================================================================
# Earthdata Login
# ============================================================================
[earthdata]
username = "${EARTHDATA_USERNAME}"
password = "${EARTHDATA_PASSWORD}"

# ============================================================================
# Output
# ============================================================================
[output]
# local | s3
destination = "local"

# Directory, or bucket with optional prefix for s3 (required)
path = "./data"

# Extra key prefix below the bucket (s3 only)
prefix = ""

# flat | year_doy | year_month_day | year | cycle
layout = "flat"

# Hours added to the granule start time before choosing a date directory
offset_hours = 0

# Commands run on each downloaded file; the path is appended
# process_commands = ["gzip -k"]

# ============================================================================
# Transfer
# ============================================================================
[transfer]
timeout_seconds = 600
concurrency = 1

# ============================================================================
# Logging
# ============================================================================
[logging]
local_enabled = false
local_path = "logs"
# daily | hourly
local_rotation = "daily"
"#
    .to_string()
}
