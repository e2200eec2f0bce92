//! Result sink: the single writer in front of storage
//!
//! The sink owns the store outright and drains the item channel on a blocking
//! thread, so `ItemStore::insert` is only ever called from one place at a time.

use crate::crawler::ScrapedItem;
use crate::storage::{ItemStore, StorageResult};
use tokio::sync::mpsc;

const PROGRESS_INTERVAL: u64 = 100;

/// Outcome of draining the item channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkReport {
    /// Items written successfully
    pub persisted: u64,
    /// Items whose insert failed
    pub failed: u64,
}

/// Serialized consumer that persists every item it receives
pub struct ResultSink<S> {
    store: S,
    report: SinkReport,
}

impl<S: ItemStore> ResultSink<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            report: SinkReport::default(),
        }
    }

    /// Writes one item, recording the outcome
    pub fn persist(&mut self, item: &ScrapedItem) -> StorageResult<()> {
        match self.store.insert(item) {
            Ok(()) => {
                self.report.persisted += 1;
                if self.report.persisted % PROGRESS_INTERVAL == 0 {
                    tracing::info!("Persisted {} items so far", self.report.persisted);
                }
                Ok(())
            }
            Err(e) => {
                self.report.failed += 1;
                Err(e)
            }
        }
    }

    /// Drains the channel until every sender is gone
    ///
    /// Blocks the calling thread; run it under `spawn_blocking`. A failed insert
    /// is logged and skipped.
    pub fn run(mut self, mut items: mpsc::Receiver<ScrapedItem>) -> SinkReport {
        while let Some(item) = items.blocking_recv() {
            if let Err(e) = self.persist(&item) {
                tracing::warn!("Failed to insert item '{}' ({}): {}", item.title, item.url, e);
            }
        }

        tracing::info!("Total items saved to database: {}", self.report.persisted);
        self.report
    }

    pub fn report(&self) -> SinkReport {
        self.report
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
