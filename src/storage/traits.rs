//! Storage traits and error types
//!
//! This module defines the persistence interface the result sink writes
//! through, and the associated error type.

use crate::crawler::ScrapedItem;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid item: {0}")]
    InvalidItem(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Append-only store for scraped items
///
/// The pipeline hands the store to exactly one consumer, so implementations
/// never see concurrent calls and need no internal locking. `Send` is required
/// because that consumer runs on its own thread.
pub trait ItemStore: Send {
    /// Creates the backing tables and indexes if they do not exist yet
    fn ensure_schema(&mut self) -> StorageResult<()>;

    /// Appends one item
    ///
    /// Duplicates are accepted; the same title/url pair may be stored many times
    /// across runs.
    fn insert(&mut self, item: &ScrapedItem) -> StorageResult<()>;
}
