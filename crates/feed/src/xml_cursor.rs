// ABOUTME: Namespace-aware streaming pull cursor over XML feed documents.
// ABOUTME: Wraps quick-xml's NsReader with read-text, skip-subtree, and require operations.

use std::borrow::Cow;
use std::fmt;

use quick_xml::escape::{partial_escape, resolve_predefined_entity, unescape};
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::FeedError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Kind of token the cursor is positioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEvent {
    StartDocument,
    StartTag,
    EndTag,
    Text,
    EndDocument,
}

impl fmt::Display for XmlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            XmlEvent::StartDocument => "start of document",
            XmlEvent::StartTag => "start tag",
            XmlEvent::EndTag => "end tag",
            XmlEvent::Text => "text",
            XmlEvent::EndDocument => "end of document",
        };
        write!(f, "{}", s)
    }
}

/// An attribute of the current start tag, with its namespace resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

/// Forward-only cursor over one document.
///
/// Every parse owns its own cursor; nothing is shared between documents.
/// Empty elements (`<a/>`) are reported as a start tag followed by an end tag.
pub struct XmlCursor<'i> {
    reader: NsReader<&'i [u8]>,
    event: XmlEvent,
    name: String,
    prefix: Option<String>,
    namespace: Option<String>,
    attributes: Vec<XmlAttribute>,
    /// Source-like markup of the current tag, used when a text read runs into
    /// nested elements.
    markup: String,
    text: String,
    depth: usize,
    empty_pending: bool,
}

impl<'i> XmlCursor<'i> {
    pub fn new(data: &'i [u8]) -> Self {
        let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
        let start = data
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(data.len());

        Self {
            reader: NsReader::from_reader(&data[start..]),
            event: XmlEvent::StartDocument,
            name: String::new(),
            prefix: None,
            namespace: None,
            attributes: Vec::new(),
            markup: String::new(),
            text: String::new(),
            depth: 0,
            empty_pending: false,
        }
    }

    pub fn event(&self) -> XmlEvent {
        self.event
    }

    /// Local name (prefix stripped) of the current start or end tag.
    pub fn local_name(&self) -> &str {
        &self.name
    }

    /// Prefix of the current start tag as written in the document.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Resolved namespace URI of the current start or end tag. `None` for
    /// unqualified names and for prefixes the document never declared.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Text of the current text token.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Looks up an attribute of the current start tag by namespace and local
    /// name. `None` as namespace matches unprefixed attributes only.
    pub fn attribute(&self, namespace: Option<&str>, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name && attr.namespace.as_deref() == namespace)
            .map(|attr| attr.value.as_str())
    }

    /// Advances to the next token. Comments, processing instructions and
    /// declarations are skipped.
    pub fn next(&mut self) -> Result<XmlEvent, FeedError> {
        if self.empty_pending {
            self.empty_pending = false;
            self.markup.clear();
            self.attributes.clear();
            self.depth = self.depth.saturating_sub(1);
            return Ok(self.set(XmlEvent::EndTag));
        }

        loop {
            let (resolved, event) = self
                .reader
                .read_resolved_event()
                .map_err(FeedError::malformed)?;
            let namespace = namespace_of(resolved);

            match event {
                Event::Start(start) => {
                    self.load_start(&start, namespace);
                    self.markup = format!("<{}>", lossy(&start));
                    self.depth += 1;
                    return Ok(self.set(XmlEvent::StartTag));
                }
                Event::Empty(start) => {
                    self.load_start(&start, namespace);
                    self.markup = format!("<{}/>", lossy(&start));
                    self.depth += 1;
                    self.empty_pending = true;
                    return Ok(self.set(XmlEvent::StartTag));
                }
                Event::End(end) => {
                    self.name = lossy(end.local_name().as_ref()).into_owned();
                    self.markup = format!("</{}>", lossy(end.name().as_ref()));
                    self.namespace = namespace;
                    self.attributes.clear();
                    self.depth = self.depth.saturating_sub(1);
                    return Ok(self.set(XmlEvent::EndTag));
                }
                Event::Text(text) => {
                    let raw = lossy(&text);
                    self.text = unescape_lenient(&raw);
                    self.markup = raw.into_owned();
                    return Ok(self.set(XmlEvent::Text));
                }
                Event::CData(cdata) => {
                    self.text = lossy(&cdata).into_owned();
                    self.markup = partial_escape(&self.text).into_owned();
                    return Ok(self.set(XmlEvent::Text));
                }
                Event::GeneralRef(reference) => {
                    self.text = resolve_reference(&reference);
                    self.markup = format!("&{};", lossy(&reference));
                    return Ok(self.set(XmlEvent::Text));
                }
                Event::Eof => return Ok(self.set(XmlEvent::EndDocument)),
                _ => {}
            }
        }
    }

    /// Advances to the next start tag, end tag or end of document, skipping text.
    pub fn next_tag(&mut self) -> Result<XmlEvent, FeedError> {
        loop {
            match self.next()? {
                XmlEvent::Text => continue,
                event => return Ok(event),
            }
        }
    }

    /// Advances to the next child element of the current scope.
    ///
    /// Returns `true` positioned on the child's start tag, or `false`
    /// positioned on the scope's own end tag. Children must be fully consumed
    /// (read, skipped or parsed) before calling again.
    pub fn next_child(&mut self) -> Result<bool, FeedError> {
        match self.next_tag()? {
            XmlEvent::StartTag => Ok(true),
            XmlEvent::EndTag => Ok(false),
            _ => Err(unexpected_end()),
        }
    }

    /// Reads the text content of the current element and leaves the cursor on
    /// its end tag. Nested elements are kept as markup in the returned text,
    /// with their text still escaped.
    pub fn read_text(&mut self) -> Result<String, FeedError> {
        self.require(XmlEvent::StartTag, None)?;
        let depth = self.depth;
        let mut text = String::new();

        loop {
            match self.next()? {
                XmlEvent::Text if self.depth > depth => text.push_str(&self.markup),
                XmlEvent::Text => text.push_str(&self.text),
                XmlEvent::EndTag if self.depth < depth => return Ok(text),
                XmlEvent::StartTag | XmlEvent::EndTag => text.push_str(&self.markup),
                _ => return Err(unexpected_end()),
            }
        }
    }

    /// Skips the current element and its whole subtree, leaving the cursor on
    /// its end tag.
    pub fn skip(&mut self) -> Result<(), FeedError> {
        self.require(XmlEvent::StartTag, None)?;
        let depth = self.depth;

        loop {
            match self.next()? {
                XmlEvent::EndTag if self.depth < depth => return Ok(()),
                XmlEvent::EndDocument => return Err(unexpected_end()),
                _ => {}
            }
        }
    }

    /// Fails unless the cursor is on `event` and, when given, on an element
    /// named `name` (compared case-insensitively).
    pub fn require(&self, event: XmlEvent, name: Option<&str>) -> Result<(), FeedError> {
        if self.event != event {
            return Err(FeedError::malformed(format!(
                "expected {event}, found {}",
                self.event
            )));
        }
        match name {
            Some(expected) if !self.name.eq_ignore_ascii_case(expected) => Err(
                FeedError::malformed(format!("expected <{expected}>, found <{}>", self.name)),
            ),
            _ => Ok(()),
        }
    }

    fn set(&mut self, event: XmlEvent) -> XmlEvent {
        self.event = event;
        event
    }

    fn load_start(&mut self, start: &BytesStart<'_>, namespace: Option<String>) {
        self.name = lossy(start.local_name().as_ref()).into_owned();
        self.prefix = start
            .name()
            .prefix()
            .map(|prefix| lossy(prefix.as_ref()).into_owned());
        self.namespace = namespace;
        self.attributes.clear();

        for attr in start.attributes().with_checks(false).flatten() {
            let (resolved, local) = self.reader.resolve_attribute(attr.key);
            let namespace = namespace_of(resolved);
            let value = unescape_lenient(&lossy(&attr.value));
            self.attributes.push(XmlAttribute {
                namespace,
                name: lossy(local.as_ref()).into_owned(),
                value,
            });
        }
    }
}

fn namespace_of(resolved: ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(namespace) => Some(lossy(namespace.0).into_owned()),
        _ => None,
    }
}

fn lossy(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

/// Unescapes XML entities, keeping the raw text when it holds references
/// XML does not define (HTML entities leaking into feeds).
fn unescape_lenient(raw: &str) -> String {
    match unescape(raw) {
        Ok(unescaped) => unescaped.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Character references and the five predefined entities are resolved;
/// anything else is kept verbatim for the HTML-aware cleanup downstream.
fn resolve_reference(reference: &BytesRef<'_>) -> String {
    if let Ok(Some(ch)) = reference.resolve_char_ref() {
        return ch.to_string();
    }
    let name = lossy(reference);
    match resolve_predefined_entity(&name) {
        Some(value) => value.to_string(),
        None => format!("&{name};"),
    }
}

fn unexpected_end() -> FeedError {
    FeedError::malformed("unexpected end of document")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor_at_root(xml: &str) -> XmlCursor<'_> {
        let mut cursor = XmlCursor::new(xml.as_bytes());
        assert_eq!(cursor.next_tag().unwrap(), XmlEvent::StartTag);
        cursor
    }

    #[test]
    fn test_read_text_with_entities_and_cdata() {
        let mut cursor = cursor_at_root("<t>Tom &amp; Jerry &#169; <![CDATA[<b>raw</b>]]></t>");
        assert_eq!(cursor.read_text().unwrap(), "Tom & Jerry © <b>raw</b>");
        assert_eq!(cursor.event(), XmlEvent::EndTag);
        assert_eq!(cursor.local_name(), "t");
    }

    #[test]
    fn test_read_text_keeps_unknown_entities() {
        let mut cursor = cursor_at_root("<t>a&nbsp;b</t>");
        assert_eq!(cursor.read_text().unwrap(), "a&nbsp;b");
    }

    #[test]
    fn test_read_text_keeps_nested_markup() {
        let mut cursor = cursor_at_root(r#"<c><div class="x"><p>Hi</p><br/></div></c>"#);
        assert_eq!(
            cursor.read_text().unwrap(),
            r#"<div class="x"><p>Hi</p><br/></div>"#
        );
        assert_eq!(cursor.depth(), 0);
    }

    #[test]
    fn test_nested_markup_keeps_escaped_text() {
        let mut cursor = cursor_at_root(
            "<c><div>a &lt;b&gt; &amp; &nbsp;<![CDATA[x<y]]></div> top &amp;</c>",
        );
        assert_eq!(
            cursor.read_text().unwrap(),
            "<div>a &lt;b&gt; &amp; &nbsp;x&lt;y</div> top &"
        );
    }

    #[test]
    fn test_children_skip_and_attributes() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:m="urn:m">
            <link rel="alternate" href="http://h/" m:kind="k"/>
            <ignored><deep>x</deep></ignored>
            <title>T</title>
        </feed>"#;
        let mut cursor = cursor_at_root(xml);
        assert_eq!(cursor.namespace(), Some("http://www.w3.org/2005/Atom"));

        assert!(cursor.next_child().unwrap());
        assert_eq!(cursor.local_name(), "link");
        assert_eq!(cursor.attribute(None, "href"), Some("http://h/"));
        assert_eq!(cursor.attribute(Some("urn:m"), "kind"), Some("k"));
        assert_eq!(cursor.attribute(None, "kind"), None);
        cursor.skip().unwrap();

        assert!(cursor.next_child().unwrap());
        assert_eq!(cursor.local_name(), "ignored");
        cursor.skip().unwrap();

        assert!(cursor.next_child().unwrap());
        assert_eq!(cursor.read_text().unwrap(), "T");

        assert!(!cursor.next_child().unwrap());
        assert_eq!(cursor.local_name(), "feed");
        assert_eq!(cursor.next_tag().unwrap(), XmlEvent::EndDocument);
    }

    #[test]
    fn test_undeclared_prefix_has_no_namespace() {
        let mut cursor = cursor_at_root("<item><dc:date>2020-01-02</dc:date></item>");
        assert!(cursor.next_child().unwrap());
        assert_eq!(cursor.local_name(), "date");
        assert_eq!(cursor.prefix(), Some("dc"));
        assert_eq!(cursor.namespace(), None);
    }

    #[test]
    fn test_require() {
        let cursor = cursor_at_root("<rss/>");
        assert!(cursor.require(XmlEvent::StartTag, Some("RSS")).is_ok());
        assert!(cursor.require(XmlEvent::StartTag, Some("feed")).is_err());
        assert!(cursor.require(XmlEvent::EndTag, None).is_err());
    }

    #[test]
    fn test_bom_and_leading_whitespace() {
        let xml = b"\xEF\xBB\xBF\n  <?xml version=\"1.0\"?><rss/>";
        let mut cursor = XmlCursor::new(xml);
        assert_eq!(cursor.next_tag().unwrap(), XmlEvent::StartTag);
        assert_eq!(cursor.local_name(), "rss");
    }

    #[test]
    fn test_mismatched_end_tag_is_malformed() {
        let mut cursor = cursor_at_root("<a><b>text</c></a>");
        assert!(cursor.next_child().unwrap());
        let err = cursor.read_text().unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_truncated_document_is_malformed() {
        let mut cursor = cursor_at_root("<a><b>text");
        assert!(cursor.next_child().unwrap());
        assert!(cursor.read_text().is_err());
    }
}
