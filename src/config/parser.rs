use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Command-line values that take precedence over the configuration file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<String>,
    pub concurrency: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub selector: Option<String>,
    /// Replaces the configured URL list when non-empty
    pub urls: Vec<String>,
}

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use title_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Workers: {}", config.crawler.concurrency);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = read_config(path)?;
    validate(&config)?;
    Ok(config)
}

/// Builds the effective configuration for a run
///
/// Reads the file when one is given (defaults otherwise), applies the
/// command-line overrides, and validates the result.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<Config, ConfigError> {
    let config = match path {
        Some(path) => read_config(path)?,
        None => Config::default(),
    };

    let config = apply_overrides(config, overrides);
    validate(&config)?;
    Ok(config)
}

/// Reads and parses a configuration file without validating it
fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

fn apply_overrides(mut config: Config, overrides: ConfigOverrides) -> Config {
    if let Some(database_path) = overrides.database_path {
        config.output.database_path = database_path;
    }
    if let Some(concurrency) = overrides.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(timeout) = overrides.request_timeout_secs {
        config.crawler.request_timeout_secs = timeout;
    }
    if let Some(user_agent) = overrides.user_agent {
        config.crawler.user_agent = user_agent;
    }
    if let Some(selector) = overrides.selector {
        config.crawler.selector = selector;
    }
    if !overrides.urls.is_empty() {
        config.urls = overrides.urls;
    }
    config
}
