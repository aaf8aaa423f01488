//! Crawl orchestration
//!
//! The coordinator walks the page range, turns each listing page into post
//! summaries, and fans post processing out through a bounded worker pool.
//! Failure isolation is per post: a post that cannot be fetched, extracted
//! or persisted is logged and counted, and its siblings, its page, and the
//! rest of the run continue untouched.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_document};
use crate::extract::{parse_listing_page, parse_post};
use crate::images::{download_post_images, ImageOutcome};
use crate::model::{PostRecord, PostSummary};
use crate::output::{allocate_dir, write_record, FailureCategory, FailureSink};
use crate::url::ListingUrl;
use crate::{CrawlError, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Counters for one completed crawl run
#[derive(Debug, Default, Clone, Copy)]
pub struct CrawlSummary {
    pub pages_processed: u64,
    pub posts_processed: u64,
    pub posts_failed: u64,
    pub images_downloaded: u64,
    pub images_failed: u64,
}

impl CrawlSummary {
    /// Fraction of attempted posts that failed; 0.0 when nothing ran
    pub fn failure_ratio(&self) -> f64 {
        let attempted = self.posts_processed + self.posts_failed;
        if attempted == 0 {
            0.0
        } else {
            self.posts_failed as f64 / attempted as f64
        }
    }
}

/// Outcome of one spawned post task
enum PostStatus {
    Done(ImageOutcome),
    Failed,
    Skipped,
}

/// Main crawl coordinator
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    failures: Arc<dyn FailureSink>,
    cancel: CancellationToken,
}

impl Coordinator {
    pub fn new(config: Config, failures: Arc<dyn FailureSink>) -> Result<Self> {
        let client = build_http_client(Duration::from_secs(config.crawl.request_timeout_secs))?;

        Ok(Self {
            config: Arc::new(config),
            client,
            failures,
            cancel: CancellationToken::new(),
        })
    }

    /// Token that stops the crawl at the next page or post boundary;
    /// in-flight posts finish cleanly
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the crawl over the configured page range
    ///
    /// The listing URL is normalized up front; an unrecognized URL aborts
    /// before any page is fetched. Every later failure is contained.
    pub async fn run(&self) -> Result<CrawlSummary> {
        let listing = ListingUrl::parse(&self.config.board.listing_url)?;

        let range = self.config.crawl.start_page..=self.config.crawl.end_page;
        tracing::info!(
            "Crawling {} pages {}-{} into {}",
            listing.as_url(),
            self.config.crawl.start_page,
            self.config.crawl.end_page,
            self.config.output.download_root.display()
        );

        let semaphore = Arc::new(Semaphore::new(self.config.crawl.max_concurrent_posts));
        let mut summary = CrawlSummary::default();

        for page in range {
            if self.cancel.is_cancelled() {
                tracing::info!("Cancellation requested, stopping before page {}", page);
                break;
            }

            let page_url = listing.page_url(page);
            tracing::debug!("Fetching listing page {}", page_url);

            let html = match fetch_document(&self.client, page_url.as_str()).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::error!("Failed to fetch listing page {}: {}", page_url, e);
                    continue;
                }
            };

            let rows = parse_listing_page(
                &html,
                &self.config.crawl.pinned_marker,
                listing.as_url(),
            );
            summary.pages_processed += 1;
            tracing::info!("Page {}: {} posts", page, rows.len());

            self.process_rows(rows, &semaphore, &mut summary).await;
        }

        tracing::info!(
            "Crawl finished: {} pages, {} posts ok, {} posts failed, {} images ok, {} images failed",
            summary.pages_processed,
            summary.posts_processed,
            summary.posts_failed,
            summary.images_downloaded,
            summary.images_failed
        );

        Ok(summary)
    }

    /// Dispatches one page's rows through the worker pool and waits for
    /// all of them
    async fn process_rows(
        &self,
        rows: Vec<PostSummary>,
        semaphore: &Arc<Semaphore>,
        summary: &mut CrawlSummary,
    ) {
        let mut tasks = JoinSet::new();

        for row in rows {
            let client = self.client.clone();
            let config = Arc::clone(&self.config);
            let failures = Arc::clone(&self.failures);
            let cancel = self.cancel.clone();
            let semaphore = Arc::clone(semaphore);

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return PostStatus::Skipped,
                };
                if cancel.is_cancelled() {
                    return PostStatus::Skipped;
                }

                let url = row.url.clone();
                match process_post(&client, failures.as_ref(), &config, row).await {
                    Ok(images) => PostStatus::Done(images),
                    Err(e) => {
                        tracing::warn!("Post {} failed: {}", url, e);
                        PostStatus::Failed
                    }
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(PostStatus::Done(images)) => {
                    summary.posts_processed += 1;
                    summary.images_downloaded += images.downloaded;
                    summary.images_failed += images.failed;
                }
                Ok(PostStatus::Failed) => summary.posts_failed += 1,
                Ok(PostStatus::Skipped) => {}
                Err(e) => {
                    summary.posts_failed += 1;
                    tracing::error!("Post task aborted: {}", e);
                }
            }
        }
    }
}

/// Processes a single post end to end
///
/// Allocates the post's directory, downloads its images, extracts body and
/// comments from one post-page fetch, and writes `info.json`. The image
/// pass is best-effort: its failures are logged per image and never block
/// the metadata artifact.
async fn process_post(
    client: &Client,
    failures: &dyn FailureSink,
    config: &Config,
    summary: PostSummary,
) -> Result<ImageOutcome> {
    let url = summary.url.clone();
    let post_url = Url::parse(&url)?;

    let dir = match allocate_dir(&config.output.download_root, &summary.title) {
        Ok(dir) => dir,
        Err(e) => {
            failures.record(FailureCategory::Write, &url);
            return Err(CrawlError::Io(e));
        }
    };

    let images = match download_post_images(
        client,
        failures,
        &post_url,
        &dir,
        config.crawl.image_retries,
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!("Image pass failed for {}: {}", url, e);
            failures.record(FailureCategory::Get, &url);
            ImageOutcome::default()
        }
    };

    let written = async {
        let html = fetch_document(client, post_url.as_str()).await?;
        let (content, comments) = parse_post(&html)?;
        let record = PostRecord::new(summary, content, comments);
        write_record(&dir, &record)
    }
    .await;

    match written {
        Ok(()) => Ok(images),
        Err(e) => {
            failures.record(FailureCategory::WriteJson, &url);
            Err(e)
        }
    }
}

/// Runs a complete crawl with a fresh coordinator
pub async fn crawl(config: Config, failures: Arc<dyn FailureSink>) -> Result<CrawlSummary> {
    Coordinator::new(config, failures)?.run().await
}
