//! Storage module for persisting scraped items
//!
//! This module handles all database operations for the harvester:
//! - SQLite database initialization and schema management
//! - Appending scraped title/url rows
//! - Read-side queries for statistics

mod schema;
mod sqlite;
mod traits;

pub use schema::SCHEMA_SQL;
pub use sqlite::SqliteStorage;
pub use traits::{ItemStore, StorageError, StorageResult};

use std::path::Path;

/// Opens a storage database, creating the file and schema if needed
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// A row read back from the `titles` table
#[derive(Debug, Clone)]
pub struct StoredItem {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub created_at: Option<String>,
}
