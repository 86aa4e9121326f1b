//! Sync coordinator - main orchestrator for one run
//!
//! This module coordinates the whole run: checkpoint load, search window
//! selection, catalog search, candidate extraction and filtering, the
//! transfer phase, and finally the checkpoint commit decision.

use super::batch::{TransferAccumulator, TransferOrchestrator};
use super::commit::CheckpointCommit;
use super::hooks::{parse_hooks, PostProcessHook};
use super::summary::{SyncSummary, TransferFailure};
use crate::adapters::cmr::{CmrClient, GranuleSearch};
use crate::adapters::destination::{check_destination_supported, create_destination, DestinationHandles};
use crate::adapters::earthdata::EarthdataSession;
use crate::config::{validate_config, SyncConfig};
use crate::core::layout::{LayoutKind, OutputResolver};
use crate::core::search::query::parse_timestamp;
use crate::core::search::{extract_candidates, ExtensionFilter, SearchQuery, SearchWindow};
use crate::core::state::{Checkpoint, StateManager};
use crate::domain::{CollectionShortName, ProviderId, Result, SyncError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Sync coordinator
pub struct SyncCoordinator {
    config: SyncConfig,
    search: Arc<dyn GranuleSearch>,
    handles: DestinationHandles,
    state: StateManager,
    hooks: Vec<Arc<dyn PostProcessHook>>,
    shutdown: watch::Receiver<bool>,
}

impl SyncCoordinator {
    /// Create a coordinator with the CMR client and the configured destination
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid configuration or an
    /// unsupported destination, before any network call is made.
    pub async fn new(config: SyncConfig, shutdown: watch::Receiver<bool>) -> Result<Self> {
        validate_config(&config)?;
        check_destination_supported(config.output.destination)?;

        let session = EarthdataSession::new(
            &config.earthdata,
            config.cmr.token.clone(),
            Duration::from_secs(config.transfer.timeout_seconds),
        )?;
        let search: Arc<dyn GranuleSearch> = Arc::new(CmrClient::new(&config.cmr)?);
        let handles = create_destination(&config.output, session).await?;

        Self::with_components(config, search, handles, shutdown)
    }

    /// Create a coordinator from already built components
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a process command cannot be parsed.
    pub fn with_components(
        config: SyncConfig,
        search: Arc<dyn GranuleSearch>,
        handles: DestinationHandles,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        let hooks = parse_hooks(&config.output.process_commands)?
            .into_iter()
            .map(|hook| Arc::new(hook) as Arc<dyn PostProcessHook>)
            .collect();
        let state = StateManager::new_with_store(handles.store.clone());

        Ok(Self {
            config,
            search,
            handles,
            state,
            hooks,
            shutdown,
        })
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Run once, using the current time as the run's start
    pub async fn execute(&self) -> Result<SyncSummary> {
        self.execute_at(Utc::now()).await
    }

    /// Run once with an explicit start time
    ///
    /// `now` is truncated to whole seconds. It bounds an open temporal
    /// window and becomes the new checkpoint if the run commits.
    ///
    /// # Errors
    ///
    /// Configuration, search and checkpoint-load errors abort the run with
    /// the checkpoint untouched. Transfer failures and checkpoint write
    /// failures are reported in the summary instead.
    pub async fn execute_at(&self, now: DateTime<Utc>) -> Result<SyncSummary> {
        let started = Instant::now();
        let now = Checkpoint::new(now).timestamp();
        let dry_run = self.config.application.dry_run;
        let layout = self.config.output.layout;
        let mut summary = SyncSummary {
            dry_run,
            ..Default::default()
        };

        // Everything user supplied is checked before the first network call
        let (start, end) = self.explicit_bounds()?;
        let default = Checkpoint::window_default(now, self.config.search.minutes);
        let mut query = self.build_query(SearchWindow::UpdatedSince(default))?;

        let checkpoint = self.state.load_or_default(default).await?;
        query.window = SearchWindow::select(start, end, now, checkpoint);
        summary.window = query.window.to_string();

        tracing::info!(
            collection = %query.collection,
            window = %query.window,
            layout = %layout,
            destination = %self.handles.destination.location(),
            dry_run,
            "Starting sync"
        );

        let results = self.search.search(&query).await?;
        summary.granules_found = results.items.len();

        let extraction = extract_candidates(&results, layout, query.page_size)?;
        let filter = ExtensionFilter::new(&self.config.search.extensions);
        let candidates = filter.apply(extraction.candidates);
        summary.candidates = candidates.len();

        tracing::info!(
            granules = summary.granules_found,
            candidates = summary.candidates,
            extensions = ?filter.extensions(),
            "Candidates selected"
        );

        let orchestrator = self.orchestrator(layout, extraction.tables);
        let commit = CheckpointCommit::provisional(now).dry_run(dry_run);

        let decision = if dry_run {
            for planned in orchestrator.plan(&candidates) {
                match planned.target {
                    Ok(target) => {
                        tracing::info!(url = %planned.url, target = %target, "Would transfer");
                        summary.planned.push(target.to_string());
                    }
                    Err(cause) => {
                        tracing::warn!(url = %planned.url, error = %cause, "Cannot resolve target");
                        summary.failures += 1;
                        summary.errors.push(TransferFailure {
                            url: planned.url,
                            cause,
                        });
                    }
                }
            }
            commit.decide(&TransferAccumulator::default())
        } else {
            let acc = orchestrator.run(&candidates).await;
            summary.successes = acc.success_count;
            summary.failures = acc.failure_count;
            summary.skipped = acc.skipped;
            summary.bytes_transferred = acc.bytes;
            summary.interrupted = acc.interrupted;
            let decision = commit.decide(&acc);
            summary.errors = acc.failures;
            decision
        };

        summary.checkpoint = decision.apply(&self.state).await;
        Ok(summary.with_duration(started.elapsed()))
    }

    fn explicit_bounds(&self) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        let start = self
            .config
            .search
            .start_date
            .as_deref()
            .map(|s| parse_timestamp(s, "start-date"))
            .transpose()?;
        let end = self
            .config
            .search
            .end_date
            .as_deref()
            .map(|s| parse_timestamp(s, "end-date"))
            .transpose()?;
        Ok((start, end))
    }

    fn build_query(&self, window: SearchWindow) -> Result<SearchQuery> {
        let search = &self.config.search;
        Ok(SearchQuery {
            collection: CollectionShortName::new(search.collection.as_str())
                .map_err(SyncError::Validation)?,
            provider: ProviderId::new(search.provider.as_str()).map_err(SyncError::Validation)?,
            page_size: self.config.cmr.page_size,
            bounding_box: search.bounding_box.parse()?,
            window,
            token: self.config.cmr.token.clone(),
        })
    }

    fn orchestrator(
        &self,
        layout: LayoutKind,
        tables: crate::core::layout::AttributeTables,
    ) -> TransferOrchestrator {
        let resolver = OutputResolver::new(layout, self.config.output.offset_hours, tables);
        TransferOrchestrator::new(
            resolver,
            self.handles.destination.clone(),
            self.handles.transfer.clone(),
        )
        .with_hooks(self.hooks.clone())
        .with_concurrency(self.config.transfer.concurrency)
        .with_shutdown(self.shutdown.clone())
    }
}
