//! Worker pool
//!
//! A fixed number of tokio tasks pull jobs from a shared `JobSource`, fetch and
//! extract each page, and forward the results into two bounded channels: one
//! for items, one for errors. A full channel suspends the worker; nothing is
//! dropped.
//!
//! Every sender lives inside a worker task, so both channels close exactly when
//! the last worker returns.

use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::jobs::JobSource;
use crate::crawler::ScrapedItem;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

/// Expected number of items on one listing page
pub const ITEMS_PER_PAGE_HINT: usize = 30;

/// Per-worker counters returned when the worker exits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub worker_id: usize,
    /// Jobs pulled from the source
    pub jobs: usize,
    /// Items forwarded to the item channel
    pub items: usize,
    /// Errors forwarded to the error channel
    pub failures: usize,
}

/// Totals across every worker of a pool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub workers: usize,
    pub jobs: usize,
    pub items: usize,
    pub failures: usize,
}

impl PoolStats {
    fn record(&mut self, worker: &WorkerStats) {
        self.workers += 1;
        self.jobs += worker.jobs;
        self.items += worker.items;
        self.failures += worker.failures;
    }
}

/// The running workers, joined as a group
pub struct WorkerSet {
    tasks: JoinSet<WorkerStats>,
}

impl WorkerSet {
    /// Waits for every worker to return
    ///
    /// When this resolves no worker holds a sender any more, so both output
    /// channels are closed.
    pub async fn wait(mut self) -> Result<PoolStats, JoinError> {
        let mut stats = PoolStats::default();
        let mut failure = None;

        // Keep joining after a failure; dropping the set would abort the rest
        while let Some(result) = self.tasks.join_next().await {
            match result {
                Ok(worker) => {
                    tracing::debug!(
                        "Worker {} finished: {} jobs, {} items, {} failures",
                        worker.worker_id,
                        worker.jobs,
                        worker.items,
                        worker.failures
                    );
                    stats.record(&worker);
                }
                Err(e) => {
                    tracing::error!("Worker task failed: {}", e);
                    failure.get_or_insert(e);
                }
            }
        }

        match failure {
            Some(e) => Err(e),
            None => Ok(stats),
        }
    }
}

/// What a started pool hands back to its caller
pub struct PoolOutput {
    pub items: mpsc::Receiver<ScrapedItem>,
    pub errors: mpsc::Receiver<FetchError>,
    pub workers: WorkerSet,
}

/// Fixed-size pool of fetch/extract workers
#[derive(Debug, Clone)]
pub struct WorkerPool {
    concurrency: usize,
    fetcher: Arc<Fetcher>,
    extractor: Arc<Extractor>,
    item_capacity: Option<usize>,
    error_capacity: Option<usize>,
}

impl WorkerPool {
    pub fn new(concurrency: usize, fetcher: Fetcher, extractor: Extractor) -> Self {
        Self {
            concurrency: concurrency.max(1),
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(extractor),
            item_capacity: None,
            error_capacity: None,
        }
    }

    /// Overrides the channel sizes derived from the job count
    pub fn with_queue_capacity(mut self, items: usize, errors: usize) -> Self {
        self.item_capacity = Some(items.max(1));
        self.error_capacity = Some(errors.max(1));
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Channel sizes for a run over `job_count` jobs
    pub fn queue_capacities(&self, job_count: usize) -> (usize, usize) {
        let items = self
            .item_capacity
            .unwrap_or_else(|| (job_count * ITEMS_PER_PAGE_HINT).max(1));
        let errors = self.error_capacity.unwrap_or_else(|| job_count.max(1));
        (items, errors)
    }

    /// Spawns the workers onto the current runtime
    pub fn start(&self, jobs: Arc<JobSource>, token: CancellationToken) -> PoolOutput {
        let (item_capacity, error_capacity) = self.queue_capacities(jobs.total());
        let (items_tx, items_rx) = mpsc::channel(item_capacity);
        let (errors_tx, errors_rx) = mpsc::channel(error_capacity);

        let mut tasks = JoinSet::new();
        for worker_id in 0..self.concurrency {
            let worker = Worker {
                id: worker_id,
                jobs: Arc::clone(&jobs),
                fetcher: Arc::clone(&self.fetcher),
                extractor: Arc::clone(&self.extractor),
                items: items_tx.clone(),
                errors: errors_tx.clone(),
                token: token.clone(),
            };
            tasks.spawn(worker.run());
        }

        PoolOutput {
            items: items_rx,
            errors: errors_rx,
            workers: WorkerSet { tasks },
        }
    }
}

struct Worker {
    id: usize,
    jobs: Arc<JobSource>,
    fetcher: Arc<Fetcher>,
    extractor: Arc<Extractor>,
    items: mpsc::Sender<ScrapedItem>,
    errors: mpsc::Sender<FetchError>,
    token: CancellationToken,
}

impl Worker {
    async fn run(self) -> WorkerStats {
        let mut stats = WorkerStats {
            worker_id: self.id,
            ..WorkerStats::default()
        };

        loop {
            if self.token.is_cancelled() {
                tracing::debug!("Worker {} observed cancellation", self.id);
                break;
            }

            let Some(job) = self.jobs.next_job() else {
                break;
            };
            stats.jobs += 1;
            tracing::debug!("Worker {} processing {}", self.id, job.url);

            match self.fetcher.fetch(&job.url, &self.token).await {
                Ok(document) => {
                    let items = self.extractor.extract(&document.body, &job.url);
                    tracing::debug!("Extracted {} items from {}", items.len(), job.url);

                    // No token check here: items of a finished fetch are always delivered
                    for item in items {
                        if self.items.send(item).await.is_err() {
                            tracing::warn!("Worker {}: item stream closed, stopping", self.id);
                            return stats;
                        }
                        stats.items += 1;
                    }
                }
                Err(error) => {
                    stats.failures += 1;
                    if let Err(mpsc::error::SendError(error)) = self.errors.send(error).await {
                        tracing::warn!(
                            "Worker {}: error stream closed, dropping report: {}",
                            self.id,
                            error
                        );
                    }
                }
            }
        }

        stats
    }
}
