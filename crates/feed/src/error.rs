// ABOUTME: Error types for feed parsing operations.
// ABOUTME: Provides FeedError with MalformedXml, UnsupportedFormat, and UnresolvableHost variants.

use std::fmt;
use thiserror::Error;

/// Errors that abort the parse of a whole feed document.
///
/// Per-entry anomalies (missing link, empty entry, unparseable date) are not
/// errors: they are absorbed by the readers with documented fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The document is not well-formed XML, or its structure violates what a
    /// reader required at the current position.
    #[error("malformed feed document: {0}")]
    MalformedXml(String),

    /// The root element does not belong to a supported dialect.
    #[error("unsupported feed format: root element <{0}>")]
    UnsupportedFormat(String),

    /// The feed's homepage link has no usable host, so no icon can be derived.
    #[error("cannot resolve host of homepage link {0:?}")]
    UnresolvableHost(String),
}

impl FeedError {
    /// Creates a MalformedXml error from an underlying cursor or quick-xml error.
    pub fn malformed(err: impl fmt::Display) -> Self {
        FeedError::MalformedXml(err.to_string())
    }

    /// Returns true when the failure comes from the document structure itself.
    pub fn is_malformed(&self) -> bool {
        matches!(self, FeedError::MalformedXml(_))
    }
}
