// ABOUTME: Payload models produced by the feed parser.
// ABOUTME: FeedPayload and PostPayload are immutable value records handed to the caller.

use serde::{Deserialize, Serialize};

/// A single entry/item of a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPayload {
    /// Absolute URL of the post.
    pub link: String,
    pub title: String,
    /// Cleaned plain-text rendition of the content, for list previews.
    pub description: String,
    /// The untouched text of the content field the description came from.
    pub raw_content: Option<String>,
    pub image_url: Option<String>,
    /// Publish date in epoch milliseconds.
    pub date: i64,
    pub comments_link: Option<String>,
}

/// A parsed feed with metadata and its posts in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPayload {
    /// Never empty: falls back to `link`.
    pub name: String,
    pub description: String,
    pub icon: String,
    /// The feed's site. Never empty: falls back to `link`.
    pub homepage_link: String,
    /// The source URL the caller fetched the document from.
    pub link: String,
    pub posts: Vec<PostPayload>,
}

/// Result of running the HTML extractor over a content fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedHtmlContent {
    pub image_url: Option<String>,
    /// Plain text with markup stripped and whitespace collapsed. May be empty.
    pub content: String,
}
