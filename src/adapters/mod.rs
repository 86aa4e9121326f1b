//! External system integrations for granule-sync.
//!
//! - [`cmr`] - NASA CMR granule search
//! - [`earthdata`] - authenticated HTTP session for downloads
//! - [`destination`] - local directory and S3 destinations (checkpoint store,
//!   target preparation, transfer)
//!
//! # Design Pattern
//!
//! Adapters isolate external systems behind traits ([`cmr::GranuleSearch`],
//! [`destination::CheckpointStore`], [`destination::Destination`],
//! [`destination::Transfer`]) so the sync engine can be tested with in-memory
//! implementations.
//!
//! ```rust,no_run
//! use granule_sync::adapters::cmr::{CmrClient, GranuleSearch};
//! use granule_sync::config::CmrConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CmrClient::new(&CmrConfig::default())?;
//! # Ok(())
//! # }
//! ```

pub mod cmr;
pub mod destination;
pub mod earthdata;
