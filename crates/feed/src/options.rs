// ABOUTME: Configuration for the feed parser: icon resolver, clock, and extraction policy.
// ABOUTME: FeedParserBuilder provides a fluent API for constructing FeedParser instances.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::parser::FeedParser;

/// Maps a homepage host to the URL of its icon.
pub trait IconResolver: Send + Sync {
    fn icon_for_host(&self, host: &str) -> String;
}

impl<F> IconResolver for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn icon_for_host(&self, host: &str) -> String {
        self(host)
    }
}

/// Source of the current time, used as the date of undated posts.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// `https://{host}/favicon.ico`
pub fn favicon_url(host: &str) -> String {
    format!("https://{host}/favicon.ico")
}

/// Configuration options for the feed parser.
#[derive(Clone)]
pub struct ParserOptions {
    pub icon_resolver: Arc<dyn IconResolver>,
    pub clock: Arc<dyn Clock>,
    pub skip_tracking_images: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            icon_resolver: Arc::new(favicon_url),
            clock: Arc::new(Utc::now),
            skip_tracking_images: false,
        }
    }
}

impl fmt::Debug for ParserOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserOptions")
            .field("icon_resolver", &"<dyn IconResolver>")
            .field("clock", &"<dyn Clock>")
            .field("skip_tracking_images", &self.skip_tracking_images)
            .finish()
    }
}

/// Builder for constructing FeedParser instances with custom configuration.
#[derive(Debug, Clone, Default)]
pub struct FeedParserBuilder {
    opts: ParserOptions,
}

impl FeedParserBuilder {
    /// Create a new FeedParserBuilder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resolver producing feed icons from homepage hosts.
    pub fn icon_resolver(mut self, resolver: impl IconResolver + 'static) -> Self {
        self.opts.icon_resolver = Arc::new(resolver);
        self
    }

    /// Set the clock used for posts without a usable date.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.opts.clock = Arc::new(clock);
        self
    }

    /// Skip tracking pixels when picking a post image from HTML content.
    pub fn skip_tracking_images(mut self, skip: bool) -> Self {
        self.opts.skip_tracking_images = skip;
        self
    }

    /// Build the FeedParser with the configured options.
    pub fn build(self) -> FeedParser {
        FeedParser::new(self.opts)
    }
}
