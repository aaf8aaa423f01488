use crate::config::types::Config;
use crate::url::ListingUrl;
use crate::ConfigError;

/// Validates the merged configuration
///
/// Runs before the first request: a bad listing URL or page range must
/// abort the run without fetching anything.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.board.listing_url.is_empty() {
        return Err(ConfigError::Validation(
            "listing URL is required (pass --url or set board.listing-url)".to_string(),
        ));
    }

    ListingUrl::parse(&config.board.listing_url).map_err(|e| {
        ConfigError::Validation(format!("listing URL not recognized: {e}"))
    })?;

    if config.crawl.start_page < 1 {
        return Err(ConfigError::Validation(format!(
            "start-page must be >= 1, got {}",
            config.crawl.start_page
        )));
    }

    if config.crawl.end_page < config.crawl.start_page {
        return Err(ConfigError::Validation(format!(
            "end-page ({}) must not precede start-page ({})",
            config.crawl.end_page, config.crawl.start_page
        )));
    }

    if config.crawl.max_concurrent_posts < 1 || config.crawl.max_concurrent_posts > 32 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-posts must be between 1 and 32, got {}",
            config.crawl.max_concurrent_posts
        )));
    }

    if config.crawl.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.crawl.request_timeout_secs
        )));
    }

    if config.crawl.image_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "image-retries must be >= 1, got {}",
            config.crawl.image_retries
        )));
    }

    if config.crawl.pinned_marker.is_empty() {
        return Err(ConfigError::Validation(
            "pinned-marker cannot be empty".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&config.crawl.fail_threshold) {
        return Err(ConfigError::Validation(format!(
            "fail-threshold must be within [0.0, 1.0], got {}",
            config.crawl.fail_threshold
        )));
    }

    Ok(())
}
