//! Catalog search abstraction

use super::models::SearchResults;
use crate::core::search::SearchQuery;
use crate::domain::Result;
use async_trait::async_trait;

/// Granule catalog search
///
/// Implementations return every record of the pages they fetch, in catalog
/// order. Any failure is a discovery error that aborts the run.
#[async_trait]
pub trait GranuleSearch: Send + Sync {
    /// Run the search
    async fn search(&self, query: &SearchQuery) -> Result<SearchResults>;
}
