// ABOUTME: Feed parsing entry point: detects the dialect from the root element and dispatches.
// ABOUTME: Resolves the feed icon from the homepage host after the reader finishes.

use std::fmt;

use tracing::debug;

use crate::charset::decode_document;
use crate::error::FeedError;
use crate::html_utils::HtmlExtractor;
use crate::models::FeedPayload;
use crate::options::{FeedParserBuilder, ParserOptions};
use crate::readers::atom::read_atom;
use crate::readers::common::ReadContext;
use crate::readers::rdf::read_rdf;
use crate::readers::rss::read_rss;
use crate::readers::{ATOM_03_NS, ATOM_NS};
use crate::url_utils::host_of;
use crate::xml_cursor::{XmlCursor, XmlEvent};

/// The feed dialects the parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFormat {
    Atom,
    Rss,
    Rdf,
}

impl FeedFormat {
    /// Identifies the dialect from the root start tag under the cursor.
    pub(crate) fn detect(cursor: &XmlCursor<'_>) -> Result<Self, FeedError> {
        let name = cursor.local_name();
        if name.eq_ignore_ascii_case("rss") {
            Ok(FeedFormat::Rss)
        } else if name.eq_ignore_ascii_case("rdf") {
            Ok(FeedFormat::Rdf)
        } else if name.eq_ignore_ascii_case("feed")
            && matches!(cursor.namespace(), None | Some(ATOM_NS) | Some(ATOM_03_NS))
        {
            Ok(FeedFormat::Atom)
        } else {
            Err(FeedError::UnsupportedFormat(name.to_string()))
        }
    }

    fn read(
        self,
        cursor: &mut XmlCursor<'_>,
        ctx: &ReadContext<'_>,
    ) -> Result<FeedPayload, FeedError> {
        match self {
            FeedFormat::Atom => read_atom(cursor, ctx),
            FeedFormat::Rss => read_rss(cursor, ctx),
            FeedFormat::Rdf => read_rdf(cursor, ctx),
        }
    }
}

impl fmt::Display for FeedFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FeedFormat::Atom => "atom",
            FeedFormat::Rss => "rss",
            FeedFormat::Rdf => "rdf",
        };
        write!(f, "{}", s)
    }
}

/// Parses feed documents with a fixed set of options. Cheap to clone and
/// safe to share across threads; every call works on its own cursor.
#[derive(Debug, Clone, Default)]
pub struct FeedParser {
    options: ParserOptions,
}

impl FeedParser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    /// Create a new FeedParserBuilder for configuring the parser.
    pub fn builder() -> FeedParserBuilder {
        FeedParserBuilder::new()
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parses a raw feed document.
    ///
    /// # Arguments
    /// * `data` - Raw document bytes (RSS 2.0, RDF, or Atom)
    /// * `feed_url` - The URL the document was fetched from; stored as the
    ///   payload's `link` and used as the fallback homepage
    ///
    /// # Returns
    /// * `Ok(FeedPayload)` - The feed with its posts in document order
    /// * `Err(FeedError)` - Malformed XML, unsupported root element, or a
    ///   homepage without a usable host
    pub fn parse(&self, data: &[u8], feed_url: &str) -> Result<FeedPayload, FeedError> {
        let data = decode_document(data);
        let mut cursor = XmlCursor::new(&data);
        cursor.next_tag()?;
        cursor.require(XmlEvent::StartTag, None)?;

        let format = FeedFormat::detect(&cursor)?;
        debug!(%format, feed_url, "parsing feed");

        let ctx = ReadContext {
            source_url: feed_url,
            now_ms: self.options.clock.now().timestamp_millis(),
            extractor: HtmlExtractor::new(self.options.skip_tracking_images),
        };
        let mut feed = format.read(&mut cursor, &ctx)?;

        let host = host_of(&feed.homepage_link)
            .filter(|host| !host.eq_ignore_ascii_case("localhost"))
            .ok_or_else(|| FeedError::UnresolvableHost(feed.homepage_link.clone()))?;
        feed.icon = self.options.icon_resolver.icon_for_host(&host);

        Ok(feed)
    }
}

/// Parses feed bytes with default options.
pub fn parse_feed_bytes(data: &[u8], feed_url: &str) -> Result<FeedPayload, FeedError> {
    FeedParser::default().parse(data, feed_url)
}
