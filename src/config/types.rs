use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for a crawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which board to crawl
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardConfig {
    /// Listing URL: either `<base>/<board>` or an `index.php?mid=...` form
    #[serde(rename = "listing-url", default)]
    pub listing_url: String,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// First listing page to process (inclusive)
    #[serde(rename = "start-page", default = "default_start_page")]
    pub start_page: u32,

    /// Last listing page to process (inclusive)
    #[serde(rename = "end-page", default = "default_end_page")]
    pub end_page: u32,

    /// Maximum number of posts processed concurrently
    #[serde(rename = "max-concurrent-posts", default = "default_concurrency")]
    pub max_concurrent_posts: usize,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Attempts per image download
    #[serde(rename = "image-retries", default = "default_image_retries")]
    pub image_retries: u32,

    /// Text marker identifying pinned announcement rows
    #[serde(rename = "pinned-marker", default = "default_pinned_marker")]
    pub pinned_marker: String,

    /// Post failure ratio above which the process exits non-zero;
    /// 1.0 disables the check
    #[serde(rename = "fail-threshold", default = "default_fail_threshold")]
    pub fail_threshold: f64,
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving one subdirectory per post
    #[serde(rename = "download-root", default = "default_download_root")]
    pub download_root: PathBuf,

    /// Append-only failure log file
    #[serde(rename = "log-file", default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_start_page() -> u32 {
    1
}

fn default_end_page() -> u32 {
    50
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_image_retries() -> u32 {
    3
}

fn default_pinned_marker() -> String {
    "공지".to_string()
}

fn default_fail_threshold() -> f64 {
    1.0
}

fn default_download_root() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("./logs")
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_page: default_start_page(),
            end_page: default_end_page(),
            max_concurrent_posts: default_concurrency(),
            request_timeout_secs: default_timeout_secs(),
            image_retries: default_image_retries(),
            pinned_marker: default_pinned_marker(),
            fail_threshold: default_fail_threshold(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_root: default_download_root(),
            log_file: default_log_file(),
        }
    }
}
