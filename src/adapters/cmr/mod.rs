//! NASA CMR catalog adapter
//!
//! This module provides the granule search client, the UMM JSON response
//! models, and the [`GranuleSearch`] abstraction the sync engine consumes.

pub mod client;
pub mod models;
pub mod traits;

pub use client::CmrClient;
pub use models::{GranuleRecord, RelatedUrl, SearchResults};
pub use traits::GranuleSearch;
