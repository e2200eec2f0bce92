//! Statistics generation from the harvest database
//!
//! This module provides functionality for extracting and displaying
//! statistics about stored titles.

use crate::storage::{SqliteStorage, StorageResult, StoredItem};

/// Number of recent rows shown by `--stats`
const RECENT_LIMIT: usize = 10;

/// Harvest database statistics
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Total rows in the titles table
    pub total_items: u64,

    /// Number of distinct URLs
    pub distinct_urls: u64,

    /// Most recent rows, newest first
    pub recent: Vec<StoredItem>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &SqliteStorage) -> StorageResult<StoreStatistics> {
    Ok(StoreStatistics {
        total_items: storage.count_items()?,
        distinct_urls: storage.count_distinct_urls()?,
        recent: storage.recent_items(RECENT_LIMIT)?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Stored titles: {}", stats.total_items);
    println!("  Distinct URLs: {}", stats.distinct_urls);
    let duplicates = stats.total_items.saturating_sub(stats.distinct_urls);
    println!("  Repeated URLs: {}", duplicates);
    println!();

    if !stats.recent.is_empty() {
        println!("Most Recent ({}):", stats.recent.len());
        for item in &stats.recent {
            let when = item.created_at.as_deref().unwrap_or("unknown");
            println!("  [{}] {} -> {}", when, item.title, item.url);
        }
    }
}
