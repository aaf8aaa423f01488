//! Crawling: HTTP fetching and orchestration
//!
//! `fetcher` owns the HTTP client and request policy; `coordinator` drives
//! pagination, announcement skipping, and the per-post pipeline.

mod coordinator;
mod fetcher;

pub use coordinator::{crawl, Coordinator, CrawlSummary};
pub use fetcher::{build_http_client, fetch_bytes_with_retry, fetch_document};
