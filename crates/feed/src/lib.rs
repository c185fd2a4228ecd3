// ABOUTME: Core feed ingestion library for tidings.
// ABOUTME: Parses RSS 2.0, RDF, and Atom documents into normalized feed and post payloads.

pub mod charset;
pub mod error;
pub mod html_utils;
pub mod image_utils;
pub mod models;
pub mod options;
pub mod parser;
mod readers;
pub mod text_utils;
pub mod time_parse;
pub mod url_utils;
pub mod xml_cursor;

pub use charset::decode_document;
pub use error::FeedError;
pub use html_utils::{extract_html_content, HtmlExtractor};
pub use image_utils::is_tracking_image;
pub use models::{ExtractedHtmlContent, FeedPayload, PostPayload};
pub use options::{favicon_url, Clock, FeedParserBuilder, IconResolver, ParserOptions};
pub use parser::{parse_feed_bytes, FeedFormat, FeedParser};
pub use text_utils::{clean_text, clean_text_compact, decode_entities, decode_url_encoded};
pub use time_parse::{parse_date_millis, parse_flexible_time};
pub use url_utils::{host_of, resolve_safe_url};
