//! Core data structures for crawled posts
//!
//! Internally the crate works with typed fields (`i64` counters, `bool`
//! image flag). The `info.json` artifact keeps the legacy all-string schema:
//! counters serialize as stringified sentinels and `image` as `"1"`/`"0"`,
//! so existing consumers of the layout keep working.

use serde::{Deserialize, Serialize};

/// One row of a listing page
///
/// Optional fields carry sentinel values when the listing markup omits them:
/// `thumbs_up` and `views` fall back to `-1`, `comment_count` to `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub post_number: String,
    /// Canonical post URL, always fetchable
    pub url: String,
    pub title: String,
    pub poster: String,
    pub thumbs_up: i64,
    /// Source-formatted timestamp, not normalized
    pub date: String,
    pub views: i64,
    pub comment_count: i64,
    /// At least one image marker was present on the row
    pub has_image: bool,
}

/// Ordered post body paragraphs; `None` preserves the position of a
/// paragraph that rendered empty
pub type PostContent = Vec<Option<String>>;

/// One entry in a post's comment thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "commentor")]
    pub author: String,
    pub date: String,
    /// Comment text; for a pure-sticker comment this is the sticker caption
    #[serde(rename = "comment")]
    pub body: String,
    /// Sticker image URL, empty when the comment has no sticker
    #[serde(rename = "dogdrip_con")]
    pub sticker_url: String,
    /// Mentioned author handle for replies, empty otherwise
    #[serde(rename = "reply_to")]
    pub reply_target: String,
}

/// The terminal per-post artifact, serialized once as `info.json`
///
/// Field order matches the declaration order below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    #[serde(rename = "postnum")]
    pub post_number: String,
    pub url: String,
    pub title: String,
    pub poster: String,
    #[serde(rename = "num_of_thumup", with = "int_string")]
    pub thumbs_up: i64,
    pub date: String,
    #[serde(with = "int_string")]
    pub views: i64,
    #[serde(rename = "num_comments", with = "int_string")]
    pub comment_count: i64,
    #[serde(rename = "image", with = "bool_string")]
    pub has_image: bool,
    #[serde(rename = "post_content")]
    pub content: PostContent,
    #[serde(rename = "post_comment_lst")]
    pub comments: Vec<Comment>,
}

impl PostRecord {
    pub fn new(summary: PostSummary, content: PostContent, comments: Vec<Comment>) -> Self {
        Self {
            post_number: summary.post_number,
            url: summary.url,
            title: summary.title,
            poster: summary.poster,
            thumbs_up: summary.thumbs_up,
            date: summary.date,
            views: summary.views,
            comment_count: summary.comment_count,
            has_image: summary.has_image,
            content,
            comments,
        }
    }
}

/// Serializes an `i64` as its decimal string (`-1`, `0`, `42`)
mod int_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Serializes a `bool` as `"1"` / `"0"`
mod bool_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "1" } else { "0" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match String::deserialize(deserializer)?.as_str() {
            "1" => Ok(true),
            "0" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected \"0\" or \"1\", got {other:?}"
            ))),
        }
    }
}
