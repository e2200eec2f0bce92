//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ItemStore trait,
//! plus the read-side queries used by the `--stats` mode.

use crate::crawler::ScrapedItem;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ItemStore, StorageError, StorageResult};
use crate::storage::StoredItem;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database file and initializes the schema
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database or create the schema
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        let mut storage = Self { conn };
        storage.ensure_schema()?;
        Ok(storage)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let mut storage = Self {
            conn: Connection::open_in_memory()?,
        };
        storage.ensure_schema()?;
        Ok(storage)
    }

    /// Counts all stored rows
    pub fn count_items(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM titles", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Counts distinct URLs across all stored rows
    pub fn count_distinct_urls(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT url) FROM titles",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Returns the most recently inserted rows, newest first
    pub fn recent_items(&self, limit: usize) -> StorageResult<Vec<StoredItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, url, created_at FROM titles ORDER BY id DESC LIMIT ?1",
        )?;

        let items = stmt
            .query_map(params![limit as i64], |row| {
                Ok(StoredItem {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    url: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }
}

impl ItemStore for SqliteStorage {
    fn ensure_schema(&mut self) -> StorageResult<()> {
        initialize_schema(&self.conn)?;
        Ok(())
    }

    fn insert(&mut self, item: &ScrapedItem) -> StorageResult<()> {
        if item.title.trim().is_empty() {
            return Err(StorageError::InvalidItem(format!(
                "empty title for {}",
                item.url
            )));
        }

        let mut stmt = self
            .conn
            .prepare_cached("INSERT INTO titles (title, url) VALUES (?1, ?2)")?;
        stmt.execute(params![item.title, item.url])?;
        Ok(())
    }
}
