//! Configuration module for Title-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and layering command-line overrides on top of them.
//!
//! # Example
//!
//! ```no_run
//! use title_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Harvest will use {} workers", config.crawler.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    default_urls, Config, CrawlerConfig, OutputConfig, DEFAULT_CONCURRENCY,
    DEFAULT_DATABASE_PATH, DEFAULT_SELECTOR, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{load_config, resolve_config, ConfigOverrides};
pub use validation::validate;
