use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::{Path, PathBuf};

/// CLI-provided values layered on top of the config file
///
/// `None` means the flag was not given and the file value (or default)
/// stands.
#[derive(Debug, Default)]
pub struct Overrides {
    pub listing_url: Option<String>,
    pub download_root: Option<PathBuf>,
    pub start_page: Option<u32>,
    pub end_page: Option<u32>,
    pub max_concurrent_posts: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub fail_threshold: Option<f64>,
    pub log_file: Option<PathBuf>,
}

/// Loads and validates a configuration file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = parse_file(path)?;
    validate(&config)?;
    Ok(config)
}

/// Builds the effective configuration from an optional file plus CLI flags
///
/// Validation runs once, on the merged result.
pub fn resolve_config(
    config_file: Option<&Path>,
    overrides: Overrides,
) -> Result<Config, ConfigError> {
    let mut config = match config_file {
        Some(path) => parse_file(path)?,
        None => Config::default(),
    };

    if let Some(url) = overrides.listing_url {
        config.board.listing_url = url;
    }
    if let Some(root) = overrides.download_root {
        config.output.download_root = root;
    }
    if let Some(page) = overrides.start_page {
        config.crawl.start_page = page;
    }
    if let Some(page) = overrides.end_page {
        config.crawl.end_page = page;
    }
    if let Some(n) = overrides.max_concurrent_posts {
        config.crawl.max_concurrent_posts = n;
    }
    if let Some(secs) = overrides.request_timeout_secs {
        config.crawl.request_timeout_secs = secs;
    }
    if let Some(threshold) = overrides.fail_threshold {
        config.crawl.fail_threshold = threshold;
    }
    if let Some(path) = overrides.log_file {
        config.output.log_file = path;
    }

    validate(&config)?;
    Ok(config)
}

fn parse_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}
