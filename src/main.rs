//! Title-Harvest main entry point
//!
//! This is the command-line interface for the Title-Harvest scraper.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use title_harvest::config::{resolve_config, Config, ConfigOverrides};
use title_harvest::crawler::harvest;
use title_harvest::output::{load_statistics, print_run_report, print_statistics};
use title_harvest::storage::open_storage;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Title-Harvest: a bounded-concurrency title scraper
///
/// Fetches a list of pages concurrently, extracts story titles and links,
/// and appends them to a SQLite database. Ctrl-C stops new fetches and lets
/// the run finish cleanly.
#[derive(Parser, Debug)]
#[command(name = "title-harvest")]
#[command(version)]
#[command(about = "A bounded-concurrency title scraper", long_about = None)]
struct Cli {
    /// Pages to fetch (overrides the configured list)
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Path to SQLite database file
    #[arg(long, value_name = "PATH")]
    db: Option<String>,

    /// Number of concurrent workers
    #[arg(long)]
    concurrency: Option<u32>,

    /// HTTP request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// User-Agent for HTTP requests
    #[arg(long)]
    user_agent: Option<String>,

    /// CSS selector for the anchors to extract
    #[arg(long)]
    selector: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be fetched without fetching
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database_path: self.db.clone(),
            concurrency: self.concurrency,
            request_timeout_secs: self.timeout,
            user_agent: self.user_agent.clone(),
            selector: self.selector.clone(),
            urls: self.urls.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let config = match resolve_config(cli.config.as_deref(), cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).context("invalid configuration");
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_harvest(config, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("title_harvest=info,warn"),
            1 => EnvFilter::new("title_harvest=debug,info"),
            2 => EnvFilter::new("title_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be fetched
fn handle_dry_run(config: &Config) {
    println!("=== Title-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  User agent: {}", config.crawler.user_agent);
    println!("  Selector: {}", config.crawler.selector);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let urls = config.job_urls();
    println!("\nURLs ({}):", urls.len());
    for url in &urls {
        println!("  - {}", url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open {}", config.output.database_path))?;
    let stats = load_statistics(&storage).context("failed to load statistics")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, quiet: bool) -> anyhow::Result<()> {
    let token = CancellationToken::new();

    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received interrupt signal, shutting down gracefully...");
            signal_token.cancel();
        }
    });

    match harvest(&config, token).await {
        Ok(report) => {
            if report.cancelled {
                tracing::warn!("Harvest cancelled before all URLs were fetched");
            } else {
                tracing::info!("Harvest completed successfully");
            }
            if !quiet {
                print_run_report(&report);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e).context("harvest failed")
        }
    }
}
