//! Post-page extraction: body paragraphs and comment thread
//!
//! One fetched document yields both outputs. Paragraph positions are
//! stable: a content block that renders empty stays in the sequence as
//! `None` instead of being dropped. Comments are walked in document order,
//! which is the thread's natural oldest-first ordering.

use crate::model::{Comment, PostContent};
use crate::{ExtractError, ExtractResult};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

static CONTENT_BLOCK: Lazy<Selector> =
    Lazy::new(|| selector(".ed.clearfix.margin-vertical-large > .xe_content"));
static COMMENT_ITEM: Lazy<Selector> = Lazy::new(|| selector(".comment-list > .comment-item"));
static COMMENT_AUTHOR: Lazy<Selector> = Lazy::new(|| selector("span > span"));
static COMMENT_DATE: Lazy<Selector> = Lazy::new(|| selector(".text-xsmall"));
static COMMENT_BODY: Lazy<Selector> =
    Lazy::new(|| selector("div.ed.margin-bottom-xxsmall.margin-left-xsmall"));
static STICKER: Lazy<Selector> = Lazy::new(|| selector("div > .xe_content > a"));

/// Reply mentions are `@` followed by a handle of at least 8 non-whitespace
/// characters; the whole contiguous token is the handle.
static MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\S{8,})").expect("valid regex"));

/// Pulls the first `url(...)` value out of an inline style
static STYLE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"url\(\s*['"]?([^'")]+?)['"]?\s*\)"#).expect("valid regex"));

fn block_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

/// Extracts body paragraphs and the comment list from a post page
pub fn parse_post(html: &str) -> ExtractResult<(PostContent, Vec<Comment>)> {
    let doc = Html::parse_document(html);

    let content = extract_content(&doc);
    let comments = extract_comments(&doc)?;

    Ok((content, comments))
}

fn extract_content(doc: &Html) -> PostContent {
    doc.select(&CONTENT_BLOCK)
        .map(|block| {
            let text = block_text(block);
            if text.is_empty() {
                None
            } else {
                Some(text)
            }
        })
        .collect()
}

fn extract_comments(doc: &Html) -> ExtractResult<Vec<Comment>> {
    let mut comments = Vec::new();

    for item in doc.select(&COMMENT_ITEM) {
        let author = item
            .select(&COMMENT_AUTHOR)
            .next()
            .map(block_text)
            .ok_or_else(|| ExtractError::MissingField {
                field: "commentor",
                selector: "span > span".to_string(),
            })?;

        let date = item
            .select(&COMMENT_DATE)
            .next()
            .map(block_text)
            .ok_or_else(|| ExtractError::MissingField {
                field: "comment date",
                selector: ".text-xsmall".to_string(),
            })?;

        let mut body = item
            .select(&COMMENT_BODY)
            .next()
            .map(block_text)
            .ok_or_else(|| ExtractError::MissingField {
                field: "comment body",
                selector: "div.ed.margin-bottom-xxsmall.margin-left-xsmall".to_string(),
            })?;

        // An empty body block means the comment is a pure sticker: its
        // caption becomes the body and its style carries the image URL.
        let mut sticker_url = String::new();
        if body.is_empty() {
            let sticker = item.select(&STICKER).next().ok_or_else(|| {
                ExtractError::MissingField {
                    field: "sticker",
                    selector: "div > .xe_content > a".to_string(),
                }
            })?;

            body = sticker
                .value()
                .attr("title")
                .unwrap_or_default()
                .to_string();
            sticker_url = sticker
                .value()
                .attr("style")
                .map(style_url)
                .unwrap_or_default();
        }

        let (body, reply_target) = split_reply_target(body);

        comments.push(Comment {
            author,
            date,
            body,
            sticker_url,
            reply_target,
        });
    }

    Ok(comments)
}

/// Detects a reply mention in a comment body
///
/// Returns the body with the first mention occurrence removed (and
/// re-trimmed) plus the mentioned handle, or the body untouched with an
/// empty target when no mention is present.
fn split_reply_target(body: String) -> (String, String) {
    match MENTION.captures(&body) {
        Some(caps) => {
            let target = caps[1].to_string();
            let stripped = body
                .replacen(&format!("@{target}"), "", 1)
                .trim()
                .to_string();
            (stripped, target)
        }
        None => (body, String::new()),
    }
}

fn style_url(style: &str) -> String {
    STYLE_URL
        .captures(style)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| style.to_string())
}
