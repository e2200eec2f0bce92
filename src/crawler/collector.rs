//! Error collector
//!
//! Drains the error channel for reporting. Nothing downstream depends on it.

use crate::crawler::fetcher::{FetchError, FetchErrorKind};
use tokio::sync::mpsc;

/// Every fetch error seen during a run
#[derive(Debug, Clone, Default)]
pub struct ErrorReport {
    pub errors: Vec<FetchError>,
}

impl ErrorReport {
    pub fn count(&self) -> usize {
        self.errors.len()
    }

    /// Errors for jobs that were skipped because the run was cancelled
    pub fn cancelled(&self) -> usize {
        self.errors
            .iter()
            .filter(|e| e.kind == FetchErrorKind::Cancelled)
            .count()
    }
}

/// Single consumer of the error channel
#[derive(Debug, Default)]
pub struct ErrorCollector {
    report: ErrorReport,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, error: FetchError) {
        match error.kind {
            FetchErrorKind::Cancelled => tracing::debug!("Error: {}", error),
            _ => tracing::warn!("Error: {}", error),
        }
        self.report.errors.push(error);
    }

    /// Drains the channel until every sender is gone
    pub async fn run(mut self, mut errors: mpsc::Receiver<FetchError>) -> ErrorReport {
        while let Some(error) = errors.recv().await {
            self.record(error);
        }

        if self.report.count() > 0 {
            tracing::info!("{} URLs failed", self.report.count());
        }
        self.report
    }
}
