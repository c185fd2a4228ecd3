// ABOUTME: Format-specific streaming readers for Atom, RSS 2.0, and RDF documents.
// ABOUTME: Holds the namespace vocabulary shared by the readers.

pub(crate) mod atom;
pub(crate) mod common;
pub(crate) mod rdf;
pub(crate) mod rss;

use crate::xml_cursor::XmlCursor;

pub(crate) const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
pub(crate) const ATOM_03_NS: &str = "http://purl.org/atom/ns#";
pub(crate) const RSS_10_NS: &str = "http://purl.org/rss/1.0/";
pub(crate) const RSS_090_NS: &str = "http://my.netscape.com/rdf/simple/0.9/";

/// Which vocabulary the current element belongs to, from a reader's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Vocabulary {
    /// The dialect's own elements (or unqualified ones).
    Own,
    Content,
    DublinCore,
    Media,
    Other,
}

/// Classifies the element under the cursor. `own` lists the namespaces the
/// reader treats as its dialect. Undeclared prefixes fall back to their
/// conventional meaning.
pub(crate) fn vocabulary(cursor: &XmlCursor<'_>, own: &[&str]) -> Vocabulary {
    match (cursor.namespace(), cursor.prefix()) {
        (Some(ns), _) if own.contains(&ns) => Vocabulary::Own,
        (Some(ns), _) => match ns.trim_end_matches('/') {
            "http://purl.org/rss/1.0/modules/content" => Vocabulary::Content,
            "http://purl.org/dc/elements/1.1" => Vocabulary::DublinCore,
            "http://search.yahoo.com/mrss" => Vocabulary::Media,
            _ => Vocabulary::Other,
        },
        (None, None) => Vocabulary::Own,
        (None, Some("content")) => Vocabulary::Content,
        (None, Some("dc")) => Vocabulary::DublinCore,
        (None, Some("media")) => Vocabulary::Media,
        (None, Some(_)) => Vocabulary::Other,
    }
}
