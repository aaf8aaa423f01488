//! HTTP fetching
//!
//! One shared `reqwest::Client` serves the whole crawl. Page fetches are
//! single-shot; the retrying variant exists only for image downloads, where
//! transient failures are common enough to be worth absorbing. Transport
//! errors and 5xx responses are retried, 4xx responses fail immediately.

use crate::{CrawlError, Result};
use reqwest::Client;
use std::time::Duration;

/// Builds the HTTP client used for every request in a crawl
pub fn build_http_client(timeout: Duration) -> std::result::Result<Client, reqwest::Error> {
    let user_agent = format!("dripgrab/{}", env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page body as text
///
/// Single GET, no retry at this layer. A non-success status surfaces as
/// `CrawlError::HttpStatus` to the immediate caller.
pub async fn fetch_document(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await.map_err(|e| CrawlError::Http {
        url: url.to_string(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CrawlError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| CrawlError::Http {
        url: url.to_string(),
        source: e,
    })
}

/// Fetches raw bytes with bounded retries
///
/// Returns the first successful response body. Transport errors and server
/// errors consume an attempt; a client error (4xx) is not transient and
/// fails immediately. When every attempt fails, the last error is surfaced
/// rather than any stale earlier state.
pub async fn fetch_bytes_with_retry(
    client: &Client,
    url: &str,
    attempts: u32,
) -> Result<Vec<u8>> {
    let attempts = attempts.max(1);
    let mut last_err: Option<CrawlError> = None;

    for attempt in 1..=attempts {
        match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    match response.bytes().await {
                        Ok(bytes) => return Ok(bytes.to_vec()),
                        Err(e) => {
                            last_err = Some(CrawlError::Http {
                                url: url.to_string(),
                                source: e,
                            });
                        }
                    }
                } else if status.is_server_error() {
                    last_err = Some(CrawlError::HttpStatus {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                } else {
                    return Err(CrawlError::HttpStatus {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
            }
            Err(e) => {
                last_err = Some(CrawlError::Http {
                    url: url.to_string(),
                    source: e,
                });
            }
        }

        if attempt < attempts {
            tracing::debug!("Retrying {} (attempt {}/{})", url, attempt + 1, attempts);
        }
    }

    // attempts >= 1, so the loop recorded an error before falling through
    Err(last_err.expect("at least one attempt was made"))
}
