//! Run coordinator - wiring and shutdown ordering for one harvest run
//!
//! A run moves through four states:
//!
//! ```text
//! Idle ──start──▶ Dispatching ──jobs drained / cancelled──▶ Draining ──all joined──▶ Closed
//! ```
//!
//! - **Dispatching**: workers, the result sink, and the error collector are running.
//! - **Draining**: no new jobs will be handed out; the coordinator joins every
//!   worker, which drops the last channel senders, then waits for both consumers.
//! - **Closed**: terminal; the run report is available.
//!
//! Cancellation may fire in any state. It stops new jobs from being pulled but
//! the full drain still happens, so no task is abandoned.

use crate::config::Config;
use crate::crawler::collector::{ErrorCollector, ErrorReport};
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::jobs::JobSource;
use crate::crawler::pool::{PoolOutput, PoolStats, WorkerPool};
use crate::crawler::sink::{ResultSink, SinkReport};
use crate::storage::ItemStore;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Lifecycle state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Dispatching,
    Draining,
    Closed,
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    /// URLs in the job list
    pub urls_total: usize,
    /// URLs a worker actually pulled
    pub urls_attempted: usize,
    /// Items produced by extraction
    pub items_extracted: usize,
    /// Items written to storage
    pub items_persisted: u64,
    /// Items whose insert failed
    pub storage_failures: u64,
    pub fetch_errors: Vec<FetchError>,
    /// Whether the run stopped early because of cancellation
    pub cancelled: bool,
}

impl RunReport {
    pub fn error_count(&self) -> usize {
        self.fetch_errors.len()
    }
}

/// Main harvest coordinator
pub struct Coordinator {
    pool: WorkerPool,
    token: CancellationToken,
    state: RunState,
}

impl Coordinator {
    /// Creates a coordinator from the validated configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration
    /// * `token` - Cancellation token observed by every worker
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client or the selector could not be built
    pub fn new(config: &Config, token: CancellationToken) -> Result<Self, HarvestError> {
        let fetcher = Fetcher::from_config(&config.crawler)?;
        let extractor = Extractor::new(&config.crawler.selector)?;
        let pool = WorkerPool::new(config.crawler.concurrency as usize, fetcher, extractor);
        Ok(Self::with_pool(pool, token))
    }

    pub fn with_pool(pool: WorkerPool, token: CancellationToken) -> Self {
        Self {
            pool,
            token,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!("Run state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Runs the harvest over `urls`, writing every item to `store`
    ///
    /// Per-URL and per-item failures never abort the run; they are counted in
    /// the report. A store whose schema cannot be created fails the run before
    /// any worker starts. A coordinator runs once; calling this again is an error.
    pub async fn run<S>(
        &mut self,
        urls: Vec<String>,
        mut store: S,
    ) -> Result<RunReport, HarvestError>
    where
        S: ItemStore + 'static,
    {
        if self.state != RunState::Idle {
            return Err(HarvestError::AlreadyRan);
        }

        store.ensure_schema()?;

        let started_at = Utc::now();
        let start = Instant::now();

        let jobs = Arc::new(JobSource::new(urls));
        let urls_total = jobs.total();
        tracing::info!(
            "Starting to process {} URLs with {} workers",
            urls_total,
            self.pool.concurrency()
        );

        self.transition(RunState::Dispatching);
        let PoolOutput {
            items,
            errors,
            workers,
        } = self.pool.start(Arc::clone(&jobs), self.token.clone());

        let sink = tokio::task::spawn_blocking(move || ResultSink::new(store).run(items));
        let collector = tokio::spawn(ErrorCollector::new().run(errors));

        let joined = workers.wait();
        tokio::pin!(joined);

        let token = self.token.clone();
        let finished_early = tokio::select! {
            result = &mut joined => Some(result),
            _ = dispatch_finished(&jobs, &token) => None,
        };

        self.transition(RunState::Draining);
        let pool_result = match finished_early {
            Some(result) => result,
            None => joined.await,
        };

        // Both consumers finish once the last worker has dropped its senders
        let sink_result = sink.await;
        let collector_result = collector.await;

        let pool_stats: PoolStats = pool_result?;
        let sink_report: SinkReport = sink_result?;
        let error_report: ErrorReport = collector_result?;
        tracing::debug!("Item and error streams drained");

        self.transition(RunState::Closed);

        let cancelled = self.token.is_cancelled()
            && (pool_stats.jobs < urls_total || error_report.cancelled() > 0);
        let report = RunReport {
            started_at,
            elapsed: start.elapsed(),
            urls_total,
            urls_attempted: pool_stats.jobs,
            items_extracted: pool_stats.items,
            items_persisted: sink_report.persisted,
            storage_failures: sink_report.failed,
            fetch_errors: error_report.errors,
            cancelled,
        };

        tracing::info!(
            "Run closed: {} of {} URLs attempted, {} items persisted, {} fetch errors in {:?}",
            report.urls_attempted,
            report.urls_total,
            report.items_persisted,
            report.error_count(),
            report.elapsed
        );

        Ok(report)
    }
}

/// Resolves once no further job will be handed out
async fn dispatch_finished(jobs: &JobSource, token: &CancellationToken) {
    tokio::select! {
        _ = jobs.drained() => {
            tracing::debug!("All {} jobs handed out", jobs.total());
        }
        _ = token.cancelled() => {
            tracing::info!(
                "Cancellation requested, {} jobs will not be dispatched",
                jobs.remaining()
            );
        }
    }
}
