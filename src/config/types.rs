use serde::Deserialize;
use std::time::Duration;

/// Default number of concurrent workers
pub const DEFAULT_CONCURRENCY: u32 = 10;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default outbound User-Agent
pub const DEFAULT_USER_AGENT: &str = "TitleHarvest/1.0";

/// Default selector for story title links
pub const DEFAULT_SELECTOR: &str = ".titleline > a";

/// Default SQLite database location
pub const DEFAULT_DATABASE_PATH: &str = "./scraped_titles.db";

/// Main configuration structure for Title-Harvest
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Pages to fetch. Empty means the built-in page list.
    #[serde(default)]
    pub urls: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent workers
    pub concurrency: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// CSS selector for the anchors to extract
    pub selector: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            selector: DEFAULT_SELECTOR.to_string(),
        }
    }
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
        }
    }
}

impl Config {
    /// Returns the configured URLs, or the built-in page list when none are set
    pub fn job_urls(&self) -> Vec<String> {
        if self.urls.is_empty() {
            default_urls()
        } else {
            self.urls.clone()
        }
    }
}

/// The built-in page list: the Hacker News front page and pages 2 through 30
pub fn default_urls() -> Vec<String> {
    let mut urls = Vec::with_capacity(30);
    urls.push("https://news.ycombinator.com/".to_string());
    urls.extend((2..=30).map(|page| format!("https://news.ycombinator.com/news?p={}", page)));
    urls
}
