//! CMR granule search client
//!
//! Queries `granules.umm_json` with the parameters from [`SearchQuery`],
//! following the `CMR-Search-After` cursor for up to `max_pages` pages.

use super::models::SearchResults;
use super::traits::GranuleSearch;
use crate::adapters::earthdata::USER_AGENT;
use crate::config::{CmrConfig, RetryConfig};
use crate::core::search::SearchQuery;
use crate::domain::{Result, SearchError, SyncError};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Request and response header carrying the pagination cursor
pub const SEARCH_AFTER_HEADER: &str = "CMR-Search-After";

/// CMR search client
pub struct CmrClient {
    client: Client,
    search_url: String,
    max_pages: usize,
    retry: RetryConfig,
}

/// One fetched page and the cursor for the next
struct Page {
    results: SearchResults,
    search_after: Option<String>,
}

impl CmrClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &CmrConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SyncError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            search_url: config.search_url.clone(),
            max_pages: config.max_pages.max(1),
            retry: config.retry.clone(),
        })
    }

    async fn fetch_page(&self, query: &SearchQuery, search_after: Option<&str>) -> Result<Page> {
        let mut request = self.client.get(&self.search_url).query(&query.to_params());
        if let Some(cursor) = search_after {
            request = request.header(SEARCH_AFTER_HEADER, cursor);
        }

        let resp = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout(e.to_string())
            } else {
                SearchError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let err = if status.is_server_error() {
                SearchError::ServerError {
                    status: status.as_u16(),
                    message: body,
                }
            } else {
                SearchError::ClientError {
                    status: status.as_u16(),
                    message: body,
                }
            };
            return Err(err.into());
        }

        let search_after = resp
            .headers()
            .get(SEARCH_AFTER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let results = resp
            .json::<SearchResults>()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        Ok(Page {
            results,
            search_after,
        })
    }

    /// Retry a request with exponential backoff
    ///
    /// Only connection failures, timeouts and server errors are retried.
    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_retries = self.retry.max_retries.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    let retryable = matches!(&e, SyncError::Search(s) if s.is_retryable());
                    if !retryable || attempt >= max_retries {
                        return Err(e);
                    }

                    let delay_ms = backoff_delay_ms(&self.retry, attempt);

                    tracing::warn!(
                        attempt = attempt,
                        max_retries = max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Retrying search request after error"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

/// Delay before retry number `attempt` (1-based)
fn backoff_delay_ms(retry: &RetryConfig, attempt: usize) -> u64 {
    let factor = retry.backoff_multiplier.powf(attempt.saturating_sub(1) as f64);
    let delay = retry.initial_delay_ms as f64 * factor;
    (delay as u64).min(retry.max_delay_ms)
}

#[async_trait]
impl GranuleSearch for CmrClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResults> {
        tracing::debug!(
            url = %self.search_url,
            collection = %query.collection,
            provider = %query.provider,
            window = %query.window,
            "Searching catalog"
        );

        let mut results = SearchResults::default();
        let mut cursor: Option<String> = None;

        for page_number in 1..=self.max_pages {
            let page = self
                .retry_request(|| self.fetch_page(query, cursor.as_deref()))
                .await?;

            let page_len = page.results.items.len();
            results.extend(page.results);

            tracing::debug!(
                page = page_number,
                records = page_len,
                hits = results.hits,
                "Fetched search page"
            );

            match page.search_after {
                Some(next) if page_len >= query.page_size && page_len > 0 => cursor = Some(next),
                _ => break,
            }
        }

        tracing::info!(
            collection = %query.collection,
            hits = results.hits,
            records = results.items.len(),
            "{} granules found for {} ({})",
            results.items.len(),
            query.collection,
            query.window
        );

        Ok(results)
    }
}
