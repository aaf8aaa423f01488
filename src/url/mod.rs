//! Board URL handling
//!
//! Normalizes user-supplied listing URLs into a page-indexable form and
//! resolves listing-row links to canonical post URLs. The forum identifies a
//! post by a numeric `document_srl`; permalinks carry it as the last path
//! segment (`https://host/236491770`) while legacy links carry it as a query
//! parameter (`index.php?mid=board&document_srl=236491770`).

use crate::CrawlError;
use url::Url;

/// A listing URL normalized to the `index.php?mid=<board>` form
///
/// Two input shapes are accepted:
/// - a bare board path: `https://host/board`
/// - any URL already carrying a `mid` query parameter, including the
///   popular-sort variant `index.php?mid=board&sort_index=popular`
///
/// Anything else is rejected before a single page is fetched.
#[derive(Debug, Clone)]
pub struct ListingUrl {
    base: Url,
}

impl ListingUrl {
    pub fn parse(raw: &str) -> Result<Self, CrawlError> {
        let url = Url::parse(raw).map_err(|_| CrawlError::InvalidUrl(raw.to_string()))?;

        if url.host_str().is_none() {
            return Err(CrawlError::InvalidUrl(raw.to_string()));
        }

        // Already in mid form: keep every query parameter except `page`,
        // which is ours to assign.
        if url.query_pairs().any(|(k, _)| k == "mid") {
            let mut base = url.clone();
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| k != "page")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            base.set_query(None);
            for (k, v) in &kept {
                base.query_pairs_mut().append_pair(k, v);
            }
            return Ok(Self { base });
        }

        // Bare board path: a single word-like segment and no query.
        if url.query().is_none() {
            let segments: Vec<&str> = url
                .path_segments()
                .map(|s| s.filter(|seg| !seg.is_empty()).collect())
                .unwrap_or_default();

            if let [board] = segments[..] {
                if !board.is_empty()
                    && board.chars().all(|c| c.is_alphanumeric() || c == '_')
                {
                    let mut base = url.clone();
                    base.set_path("/index.php");
                    base.set_query(None);
                    base.query_pairs_mut().append_pair("mid", board);
                    return Ok(Self { base });
                }
            }
        }

        Err(CrawlError::InvalidUrl(raw.to_string()))
    }

    /// URL of one listing page
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("page", &page.to_string());
        url
    }

    /// The underlying page-indexable URL, without a page parameter
    pub fn as_url(&self) -> &Url {
        &self.base
    }
}

/// Resolves a listing-row href to the canonical post URL
///
/// A link embedding `document_srl=<digits>` canonicalizes to
/// `<origin>/<digits>`; anything else resolves to an absolute URL against
/// the listing page and is used as-is.
pub fn canonical_post_url(href: &str, base: &Url) -> Result<Url, CrawlError> {
    let absolute = base.join(href)?;

    let srl = absolute
        .query_pairs()
        .find(|(k, _)| k == "document_srl")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()));

    match srl {
        Some(srl) => {
            let canonical = format!("{}/{}", absolute.origin().ascii_serialization(), srl);
            Ok(Url::parse(&canonical)?)
        }
        None => Ok(absolute),
    }
}

/// Extracts the numeric document identifier from a post URL
///
/// Permalink form first (last path segment), legacy query form second.
pub fn document_id(url: &Url) -> Option<String> {
    if let Some(segments) = url.path_segments() {
        if let Some(last) = segments.filter(|s| !s.is_empty()).last() {
            if !last.is_empty() && last.chars().all(|c| c.is_ascii_digit()) {
                return Some(last.to_string());
            }
        }
    }

    url.query_pairs()
        .find(|(k, _)| k == "document_srl")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()))
}
