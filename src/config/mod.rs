//! Configuration management for granule-sync.
//!
//! Configuration comes from an optional TOML file, `GRANULE_SYNC_*`
//! environment overrides and command-line flags, applied in that order.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use granule_sync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("granule-sync.toml")?;
//! println!("Collection: {}", config.search.collection);
//! println!("Destination: {}", config.output.path);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level and dry run
//! - [`SearchConfig`] - collection, bounding box, temporal range, extensions
//! - [`CmrConfig`] - search endpoint, paging, token, retry
//! - [`EarthdataConfig`] - download credentials
//! - [`OutputConfig`] - destination, layout, post-processing commands
//! - [`TransferConfig`] - timeouts and concurrency
//! - [`LoggingConfig`] - file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [search]
//! collection = "MUR25-JPL-L4-GLOB-v04.2"
//! bounding_box = "-180,-90,180,90"
//! minutes = 60
//!
//! [earthdata]
//! username = "edl_user"
//! password = "${EARTHDATA_PASSWORD}"
//!
//! [output]
//! path = "/data/mur25"
//! layout = "year_doy"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default, validate_config};
pub use schema::{
    ApplicationConfig, CmrConfig, DestinationKind, EarthdataConfig, LoggingConfig, OutputConfig,
    RetryConfig, SearchConfig, SyncConfig, TransferConfig, DEFAULT_EXTENSIONS,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
