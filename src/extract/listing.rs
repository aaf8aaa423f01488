//! Listing-row extraction
//!
//! A listing page is a table of post rows, preceded by a header row and any
//! number of administratively pinned announcement rows. Each field of a row
//! is looked up through its own selector; the fields the board may omit
//! (vote count, view count, comment count) degrade to sentinel values
//! instead of failing the row.

use crate::model::PostSummary;
use crate::url::canonical_post_url;
use crate::{ExtractError, ExtractResult};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

static ROW: Lazy<Selector> = Lazy::new(|| selector("tr"));
static POST_NUMBER: Lazy<Selector> = Lazy::new(|| selector(".ed.no"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("span.ed.title-link"));
static POSTER: Lazy<Selector> = Lazy::new(|| selector(".author"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a"));
static THUMBS_UP: Lazy<Selector> = Lazy::new(|| selector(".ed.voteNum.text-primary"));
static DATE: Lazy<Selector> = Lazy::new(|| selector(".time"));
static VIEWS: Lazy<Selector> = Lazy::new(|| selector(".readNum"));
static COMMENT_COUNT: Lazy<Selector> = Lazy::new(|| selector(".ed.text-primary"));
static IMAGE_MARKER: Lazy<Selector> = Lazy::new(|| selector(".ed.print-icon.margin-left-xxsmall"));

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn required_text(
    row: ElementRef,
    sel: &Selector,
    field: &'static str,
    css: &str,
) -> ExtractResult<String> {
    row.select(sel)
        .next()
        .map(element_text)
        .ok_or_else(|| ExtractError::MissingField {
            field,
            selector: css.to_string(),
        })
}

/// Optional numeric field: missing markup or non-numeric text degrades to
/// the sentinel instead of erroring the row
fn optional_number(row: ElementRef, sel: &Selector, sentinel: i64) -> i64 {
    row.select(sel)
        .next()
        .map(element_text)
        .and_then(|text| text.parse().ok())
        .unwrap_or(sentinel)
}

/// Converts one listing-row element into a post summary
///
/// The row's anchor decides the canonical URL: a link embedding a
/// `document_srl` parameter becomes `<origin>/<srl>`, any other link is
/// used as-is (resolved against the listing page).
pub fn extract_row(row: ElementRef, base: &Url) -> ExtractResult<PostSummary> {
    let post_number = required_text(row, &POST_NUMBER, "post_number", ".ed.no")?;
    let title = required_text(row, &TITLE, "title", "span.ed.title-link")?;
    let poster = required_text(row, &POSTER, "poster", ".author")?;
    let date = required_text(row, &DATE, "date", ".time")?;

    let href = row
        .select(&ANCHOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .ok_or_else(|| ExtractError::MissingField {
            field: "url",
            selector: "a".to_string(),
        })?;
    let url = canonical_post_url(href, base)
        .map_err(|_| ExtractError::BadLink {
            href: href.to_string(),
        })?
        .to_string();

    Ok(PostSummary {
        post_number,
        url,
        title,
        poster,
        thumbs_up: optional_number(row, &THUMBS_UP, -1),
        date,
        views: optional_number(row, &VIEWS, -1),
        comment_count: optional_number(row, &COMMENT_COUNT, 0),
        has_image: row.select(&IMAGE_MARKER).next().is_some(),
    })
}

/// Counts rows whose text carries the pinned-post marker
///
/// Re-evaluated for every page rather than once per crawl; boards are free
/// to vary their announcement count across a page range.
pub fn count_pinned_rows(doc: &Html, marker: &str) -> usize {
    doc.select(&ROW)
        .filter(|row| row.text().any(|t| t.contains(marker)))
        .count()
}

/// Parses a full listing page into post summaries
///
/// Skips the pinned rows plus the header row by position, then extracts
/// the remaining rows. A row that fails extraction is logged and dropped;
/// it never discards its siblings.
pub fn parse_listing_page(html: &str, marker: &str, base: &Url) -> Vec<PostSummary> {
    let doc = Html::parse_document(html);

    let rows: Vec<ElementRef> = doc.select(&ROW).collect();
    let pinned = count_pinned_rows(&doc, marker);

    let mut summaries = Vec::new();
    for row in rows.into_iter().skip(pinned + 1) {
        match extract_row(row, base) {
            Ok(summary) => summaries.push(summary),
            Err(e) => tracing::warn!("Skipping listing row: {}", e),
        }
    }
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.test/index.php?mid=duck&page=1").unwrap()
    }

    fn full_row() -> &'static str {
        r#"<td class="ed no">12345</td>
           <td>
             <a href="/index.php?mid=duck&document_srl=236491770">
               <span class="ed title-link">A/B: Test?</span>
             </a>
             <span class="ed text-primary">5</span>
             <span class="ed print-icon margin-left-xxsmall"></span>
           </td>
           <td class="author">someone</td>
           <td class="time">2024-01-02</td>
           <td class="ed voteNum text-primary">10</td>
           <td class="readNum">321</td>"#
    }

    fn parse_rows(body: &str) -> Html {
        Html::parse_document(&format!("<table><tbody>{body}</tbody></table>"))
    }

    fn first_row(doc: &Html) -> ElementRef {
        doc.select(&ROW).next().unwrap()
    }

    #[test]
    fn test_extract_full_row() {
        let doc = parse_rows(&format!("<tr>{}</tr>", full_row()));
        let summary = extract_row(first_row(&doc), &base_url()).unwrap();

        assert_eq!(summary.post_number, "12345");
        assert_eq!(summary.url, "https://example.test/236491770");
        assert_eq!(summary.title, "A/B: Test?");
        assert_eq!(summary.poster, "someone");
        assert_eq!(summary.thumbs_up, 10);
        assert_eq!(summary.date, "2024-01-02");
        assert_eq!(summary.views, 321);
        assert_eq!(summary.comment_count, 5);
        assert!(summary.has_image);
    }

    #[test]
    fn test_partial_row_degrades_to_sentinels() {
        let doc = parse_rows(
            r#"<tr>
                 <td class="ed no">7</td>
                 <td><a href="/99"><span class="ed title-link">title</span></a></td>
                 <td class="author">poster</td>
                 <td class="time">2024-03-04</td>
               </tr>"#,
        );
        let summary = extract_row(first_row(&doc), &base_url()).unwrap();

        assert_eq!(summary.thumbs_up, -1);
        assert_eq!(summary.views, -1);
        assert_eq!(summary.comment_count, 0);
        assert!(!summary.has_image);
        assert_eq!(summary.title, "title");
        assert_eq!(summary.url, "https://example.test/99");
    }

    #[test]
    fn test_missing_title_fails_the_row() {
        let doc = parse_rows(
            r#"<tr>
                 <td class="ed no">7</td>
                 <td><a href="/99">no title span</a></td>
                 <td class="author">poster</td>
                 <td class="time">2024-03-04</td>
               </tr>"#,
        );
        let result = extract_row(first_row(&doc), &base_url());
        assert!(matches!(
            result,
            Err(ExtractError::MissingField { field: "title", .. })
        ));
    }

    #[test]
    fn test_legacy_href_used_when_no_document_srl() {
        let doc = parse_rows(
            r#"<tr>
                 <td class="ed no">7</td>
                 <td><a href="/index.php?mid=duck&page=3"><span class="ed title-link">t</span></a></td>
                 <td class="author">p</td>
                 <td class="time">d</td>
               </tr>"#,
        );
        let summary = extract_row(first_row(&doc), &base_url()).unwrap();
        assert_eq!(summary.url, "https://example.test/index.php?mid=duck&page=3");
    }

    #[test]
    fn test_count_pinned_rows() {
        let doc = parse_rows(
            r#"<tr><td class="ed no">공지</td></tr>
               <tr><td class="ed no">공지</td></tr>
               <tr><td class="ed no">1</td></tr>"#,
        );
        assert_eq!(count_pinned_rows(&doc, "공지"), 2);
        assert_eq!(count_pinned_rows(&doc, "pinned"), 0);
    }

    #[test]
    fn test_listing_page_skips_pinned_and_header_rows() {
        // header + 2 pinned + 17 regular rows; exactly the 17 survive
        let mut body = String::from("<tr><td>number</td><td>title</td></tr>");
        for _ in 0..2 {
            body.push_str(r#"<tr><td class="ed no">공지</td><td>notice</td></tr>"#);
        }
        for i in 0..17 {
            body.push_str(&format!(
                r#"<tr>
                     <td class="ed no">{i}</td>
                     <td><a href="/{i}"><span class="ed title-link">post {i}</span></a></td>
                     <td class="author">p</td>
                     <td class="time">d</td>
                   </tr>"#
            ));
        }

        let html = format!("<table><tbody>{body}</tbody></table>");
        let summaries = parse_listing_page(&html, "공지", &base_url());

        assert_eq!(summaries.len(), 17);
        assert_eq!(summaries[0].post_number, "0");
        assert_eq!(summaries[16].post_number, "16");
    }

    #[test]
    fn test_listing_page_drops_broken_rows_only() {
        let html = r#"<table><tbody>
            <tr><td>header</td></tr>
            <tr><td class="ed no">1</td><td>no anchor here</td></tr>
            <tr>
              <td class="ed no">2</td>
              <td><a href="/2"><span class="ed title-link">ok</span></a></td>
              <td class="author">p</td>
              <td class="time">d</td>
            </tr>
        </tbody></table>"#;

        let summaries = parse_listing_page(html, "공지", &base_url());
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].post_number, "2");
    }
}
