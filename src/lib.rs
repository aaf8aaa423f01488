//! Dripgrab: a board archiver for XpressEngine-style forums
//!
//! This crate crawls a paginated forum board, extracts post metadata, bodies
//! and comment threads, downloads attached images, and materializes each post
//! as a directory holding its images and an `info.json` document.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod images;
pub mod model;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for dripgrab operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Listing URL not recognized: {0}")]
    InvalidUrl(String),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors from selector-based extraction
///
/// Optional listing fields never produce these; they degrade to sentinel
/// values instead. A required field that finds nothing errors the row or
/// post it belongs to, and only that row or post.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Required element not found: {field} ({selector})")]
    MissingField {
        field: &'static str,
        selector: String,
    },

    #[error("Invalid selector: {0}")]
    BadSelector(String),

    #[error("Unusable link target: {href}")]
    BadLink { href: String },

    #[error("No document identifier in {url}")]
    NoDocumentId { url: String },
}

/// Result type alias for dripgrab operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for extraction operations
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator, CrawlSummary};
pub use model::{Comment, PostRecord, PostSummary};
pub use output::FailureSink;
