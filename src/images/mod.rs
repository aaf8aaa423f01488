//! Post image downloading
//!
//! Images are scoped to the post's own content region: the page is queried
//! for `.document_<srl>_0`, where `<srl>` is the post's document
//! identifier, so quoted or recommended sibling posts on the same page
//! never leak into the download. Files are numbered `1.<ext>`, `2.<ext>`,
//! ... in document order regardless of the source filenames.

use crate::crawler::{fetch_bytes_with_retry, fetch_document};
use crate::output::{FailureCategory, FailureSink};
use crate::url::document_id;
use crate::{ExtractError, ExtractResult, Result};
use image::ImageFormat;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};
use url::Url;

static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("static selector is valid"));

/// Per-post download counters
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageOutcome {
    pub downloaded: u64,
    pub failed: u64,
}

/// Collects the image URLs of a post, in document order
///
/// Relative `src` attributes resolve against the post URL; an element
/// without a usable `src` is skipped.
pub fn collect_image_urls(html: &str, post_url: &Url) -> ExtractResult<Vec<Url>> {
    let srl = document_id(post_url).ok_or_else(|| ExtractError::NoDocumentId {
        url: post_url.to_string(),
    })?;

    let region_selector = Selector::parse(&format!(".document_{srl}_0"))
        .map_err(|e| ExtractError::BadSelector(e.to_string()))?;

    let doc = Html::parse_document(html);
    let mut urls = Vec::new();

    for region in doc.select(&region_selector) {
        for img in region.select(&IMG) {
            let Some(src) = img.value().attr("src") else {
                continue;
            };
            match post_url.join(src) {
                Ok(url) => urls.push(url),
                Err(e) => tracing::debug!("Skipping unparsable image src {:?}: {}", src, e),
            }
        }
    }

    Ok(urls)
}

/// Downloads every image of a post into `dir`
///
/// Fetches the post page, collects its scoped image URLs, and writes each
/// image under a sequential 1-based filename. A failed fetch, decode or
/// write is logged to the failure sink and does not abort the remaining
/// images; only failing to fetch or scope the post page itself errors.
pub async fn download_post_images(
    client: &Client,
    failures: &dyn FailureSink,
    post_url: &Url,
    dir: &Path,
    retry_attempts: u32,
) -> Result<ImageOutcome> {
    let html = fetch_document(client, post_url.as_str()).await?;
    let urls = collect_image_urls(&html, post_url)?;

    let mut outcome = ImageOutcome::default();

    for (index, img_url) in urls.iter().enumerate() {
        let sequence = index + 1;

        let bytes = match fetch_bytes_with_retry(client, img_url.as_str(), retry_attempts).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to fetch image {}: {}", img_url, e);
                failures.record(FailureCategory::Get, img_url.as_str());
                outcome.failed += 1;
                continue;
            }
        };

        match save_image(&bytes, dir, sequence) {
            Ok(path) => {
                tracing::debug!("Wrote {}", path.display());
                outcome.downloaded += 1;
            }
            Err(e) => {
                tracing::warn!("Failed to write image {}: {}", img_url, e);
                failures.record(FailureCategory::Write, img_url.as_str());
                outcome.failed += 1;
            }
        }
    }

    Ok(outcome)
}

/// Decodes image bytes, normalizes to 8-bit RGB, and writes
/// `<dir>/<sequence>.<ext>`
///
/// The extension comes from the sniffed source format; when the format
/// cannot be determined the image is treated as JPEG.
fn save_image(bytes: &[u8], dir: &Path, sequence: usize) -> Result<PathBuf> {
    let format = image::guess_format(bytes).ok();
    let decoded = image::load_from_memory(bytes)?;
    let normalized = image::DynamicImage::ImageRgb8(decoded.to_rgb8());

    let (format, extension) = match format {
        Some(f) => (f, f.extensions_str().first().copied().unwrap_or("jpeg")),
        None => (ImageFormat::Jpeg, "jpeg"),
    };

    let path = dir.join(format!("{sequence}.{extension}"));
    normalized.save_with_format(&path, format)?;
    Ok(path)
}
