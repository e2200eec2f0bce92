//! Crawler module: the bounded-concurrency harvest pipeline
//!
//! This module contains the core harvesting logic:
//! - HTTP fetching with a shared client
//! - Title/link extraction from fetched documents
//! - A fixed job source and a pool of workers consuming it
//! - A single result sink in front of storage and an error collector
//! - Run coordination and shutdown ordering

mod collector;
mod coordinator;
mod extractor;
mod fetcher;
mod jobs;
mod pool;
mod sink;

pub use collector::{ErrorCollector, ErrorReport};
pub use coordinator::{Coordinator, RunReport, RunState};
pub use extractor::Extractor;
pub use fetcher::{build_http_client, FetchError, FetchErrorKind, Fetcher, RawDocument};
pub use jobs::{Job, JobSource};
pub use pool::{PoolOutput, PoolStats, WorkerPool, WorkerSet, WorkerStats, ITEMS_PER_PAGE_HINT};
pub use sink::{ResultSink, SinkReport};

use crate::config::Config;
use crate::storage::open_storage;
use crate::HarvestError;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// One extracted title/link pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedItem {
    /// Visible anchor text (or page title); never empty
    pub title: String,
    /// Raw `href` (or the page URL for the title fallback)
    pub url: String,
}

/// Runs a complete harvest
///
/// This is the main entry point for a run. It will:
/// 1. Open the SQLite database and create the schema
/// 2. Build the HTTP client and extractor
/// 3. Fetch every configured URL with the worker pool
/// 4. Persist extracted items through the single result sink
///
/// Failing to open storage or build the client aborts before any request is
/// sent. After that the run always completes with a report.
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `token` - Cancelling it stops new fetches; the run still drains and reports
///
/// # Example
///
/// ```no_run
/// use title_harvest::config::Config;
/// use title_harvest::crawler::harvest;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = harvest(&Config::default(), CancellationToken::new()).await?;
/// println!("Saved {} titles", report.items_persisted);
/// # Ok(())
/// # }
/// ```
pub async fn harvest(config: &Config, token: CancellationToken) -> Result<RunReport, HarvestError> {
    let storage = open_storage(Path::new(&config.output.database_path))?;
    tracing::info!("Opened database at {}", config.output.database_path);

    let mut coordinator = Coordinator::new(config, token)?;
    coordinator.run(config.job_urls(), storage).await
}
