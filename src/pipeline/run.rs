// src/pipeline/run.rs

//! One change-detection pass per source.
//!
//! adapter → timeline → reconcile → download → persist

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::stream::{self, StreamExt};
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{Config, DownloadStats, ReconcileCounts, RunStatistics, SourceConfig};
use crate::services::{ArtifactFetcher, HttpFetcher, SourceAdapter, adapter_for, download_all};
use crate::storage::{LocalStorage, StateStore};
use crate::utils::http::create_async_client;

use super::reconcile::{PendingFetch, Reconciler};
use super::timeline::TimelineBuilder;

/// Per-pass switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Reconcile and report, but download nothing and leave the ledger and
    /// metadata untouched
    pub dry_run: bool,
}

/// What one pass did for one source.
#[derive(Debug, Clone, Default)]
pub struct SourceReport {
    pub source_id: String,
    pub source_name: String,
    /// Announcements returned by the adapter
    pub scraped: usize,
    /// Events left after triage
    pub relevant: usize,
    pub counts: ReconcileCounts,
    pub downloads: DownloadStats,
    pub to_fetch: Vec<PendingFetch>,
    /// Files that could not be written, with the reason
    pub write_failures: Vec<String>,
}

impl SourceReport {
    fn new(source: &SourceConfig) -> Self {
        Self {
            source_id: source.id.clone(),
            source_name: source.name.clone(),
            ..Self::default()
        }
    }

    /// True when every state file was written.
    pub fn is_clean(&self) -> bool {
        self.write_failures.is_empty()
    }

    fn record_write(&mut self, result: Result<()>) {
        if let Err(e) = result {
            log::error!("{}: {}", self.source_id, e);
            self.write_failures.push(e.to_string());
        }
    }
}

/// Shared context for running passes.
pub struct Pipeline {
    config: Arc<Config>,
    builder: TimelineBuilder,
    client: Client,
    fetcher: Arc<dyn ArtifactFetcher>,
}

impl Pipeline {
    /// Build a pipeline that fetches over HTTP.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = create_async_client(&config.crawler)?;
        let fetcher = Arc::new(HttpFetcher::new(client.clone()));
        Self::with_fetcher(config, client, fetcher)
    }

    /// Build a pipeline with a caller-supplied artifact fetcher.
    pub fn with_fetcher(
        config: Arc<Config>,
        client: Client,
        fetcher: Arc<dyn ArtifactFetcher>,
    ) -> Result<Self> {
        let builder = TimelineBuilder::from_config(&config)?;
        Ok(Self {
            config,
            builder,
            client,
            fetcher,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn builder(&self) -> &TimelineBuilder {
        &self.builder
    }

    /// Run one pass for `source` using `adapter`.
    ///
    /// Adapter failures are returned as errors. Write failures are recorded
    /// on the report and the pass carries on, except that an unusable
    /// download directory leaves the ledger and metadata untouched.
    pub async fn run_source(
        &self,
        source: &SourceConfig,
        adapter: &dyn SourceAdapter,
        options: RunOptions,
    ) -> Result<SourceReport> {
        let started = Instant::now();
        let mut report = SourceReport::new(source);

        log::info!(
            "[{}] Fetching {} ({})",
            source.id,
            source.url,
            adapter.name()
        );
        let announcements = adapter
            .fetch(&self.client, &source.url)
            .await
            .map_err(|e| AppError::adapter(&source.id, e))?;
        report.scraped = announcements.len();

        if announcements.is_empty() {
            log::info!("[{}] No announcements found", source.id);
            return Ok(report);
        }
        log::info!("[{}] Found {} announcements", source.id, announcements.len());

        let (timeline, events) = self.builder.build(&source.name, &announcements);
        report.relevant = events.len();

        if events.is_empty() {
            log::info!("[{}] No relevant events after triage", source.id);
            return Ok(report);
        }

        let store = LocalStorage::new(self.config.paths.data_dir_for(&source.id));
        report.record_write(store.save_timeline(&timeline).await);
        report.record_write(store.save_events(&events).await);

        let prior = store.load_ledger().await;
        let metadata = store.load_metadata().await.unwrap_or_default();
        let recovery = metadata.recovery_index();
        let downloads_dir = self.config.paths.downloads_dir_for(&source.id);

        let reconciliation = Reconciler::new(self.builder.fingerprinter()).reconcile(
            &events,
            &prior,
            Some(&downloads_dir),
            Some(&recovery),
        );
        report.counts = reconciliation.counts;

        log::info!(
            "[{}] {} events, {} previously seen, {} to fetch ({} recovered)",
            source.id,
            report.counts.total_scraped,
            report.counts.total_previous,
            report.counts.total_new,
            report.counts.recovered
        );

        if options.dry_run {
            for item in &reconciliation.to_fetch {
                log::info!("[{}] would fetch: {}", source.id, item.event.title);
            }
            report.to_fetch = reconciliation.to_fetch;
            return Ok(report);
        }

        let mut entries = Vec::new();
        if !reconciliation.to_fetch.is_empty() {
            match download_all(
                self.fetcher.as_ref(),
                &reconciliation.to_fetch,
                &downloads_dir,
                Duration::from_millis(self.config.crawler.request_delay_ms),
                Utc::now().date_naive(),
            )
            .await
            {
                Ok(download) => {
                    report.downloads = download.stats;
                    entries = download.entries;
                }
                Err(e) => {
                    // The ledger must not record items whose artifacts were never attempted
                    log::warn!(
                        "[{}] Download directory unusable, ledger left unchanged",
                        source.id
                    );
                    report.record_write(Err(e));
                    report.to_fetch = reconciliation.to_fetch;
                    return Ok(report);
                }
            }
        }

        report.record_write(store.save_ledger(&reconciliation.fingerprints).await);

        let statistics = RunStatistics {
            reconcile: report.counts,
            downloads: report.downloads,
        };
        let next = metadata.merged(entries, events.len(), statistics);
        report.record_write(store.save_metadata(&next).await);

        report.to_fetch = reconciliation.to_fetch;

        log::info!(
            "[{}] Done in {:.2?}: {} downloaded, {} skipped, {} failed",
            source.id,
            started.elapsed(),
            report.downloads.downloaded,
            report.downloads.skipped,
            report.downloads.failed
        );

        Ok(report)
    }

    /// Run passes for the given sources concurrently.
    ///
    /// Results come back in completion order.
    pub async fn run_sources<'a>(
        &self,
        sources: impl IntoIterator<Item = &'a SourceConfig>,
        options: RunOptions,
    ) -> Vec<(String, Result<SourceReport>)> {
        let concurrency = self.config.crawler.max_concurrent.max(1);

        stream::iter(sources)
            .map(|source| async move {
                let adapter = adapter_for(&source.adapter);
                let result = self.run_source(source, adapter.as_ref(), options).await;
                if let Err(e) = &result {
                    log::warn!("[{}] Pass failed: {}", source.id, e);
                }
                (source.id.clone(), result)
            })
            .buffer_unordered(concurrency)
            .collect()
            .await
    }

    /// Run passes for every enabled source.
    pub async fn run_all(&self, options: RunOptions) -> Vec<(String, Result<SourceReport>)> {
        self.run_sources(self.config.enabled_sources(), options).await
    }
}
