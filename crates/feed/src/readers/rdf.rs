// ABOUTME: Streaming reader for RDF Site Summary (RSS 1.0 and 0.90) documents.
// ABOUTME: Items are siblings of the channel under the rdf:RDF root.

use crate::error::FeedError;
use crate::models::FeedPayload;
use crate::readers::common::{FeedDraft, ReadContext};
use crate::readers::rss::{read_channel, read_item};
use crate::readers::{vocabulary, Vocabulary, RSS_090_NS, RSS_10_NS};
use crate::xml_cursor::{XmlCursor, XmlEvent};

const OWN: &[&str] = &[RSS_10_NS, RSS_090_NS];

/// Reads an RDF document. The cursor must be on the root `<rdf:RDF>` start tag.
pub(crate) fn read_rdf(
    cursor: &mut XmlCursor<'_>,
    ctx: &ReadContext<'_>,
) -> Result<FeedPayload, FeedError> {
    cursor.require(XmlEvent::StartTag, Some("RDF"))?;
    let mut feed = FeedDraft::default();

    while cursor.next_child()? {
        match (vocabulary(cursor, OWN), cursor.local_name()) {
            (Vocabulary::Own, "channel") => read_channel(cursor, ctx, OWN, &mut feed)?,
            (Vocabulary::Own, "item") => feed.posts.push(read_item(cursor, ctx, OWN)?),
            _ => cursor.skip()?,
        }
    }

    Ok(feed.finish(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html_utils::HtmlExtractor;
    use pretty_assertions::assert_eq;

    const NOW: i64 = 1_600_000_000_000;

    fn parse(xml: &str) -> FeedPayload {
        let mut cursor = XmlCursor::new(xml.as_bytes());
        cursor.next_tag().unwrap();
        let ctx = ReadContext {
            source_url: "https://slashdot.example/rss",
            now_ms: NOW,
            extractor: HtmlExtractor::default(),
        };
        read_rdf(&mut cursor, &ctx).unwrap()
    }

    #[test]
    fn test_rss_10_document() {
        let feed = parse(
            r#"<?xml version="1.0"?>
            <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                     xmlns="http://purl.org/rss/1.0/"
                     xmlns:dc="http://purl.org/dc/elements/1.1/">
                <channel rdf:about="https://slashdot.example/">
                    <title>Slash</title>
                    <link>https://slashdot.example/</link>
                    <description>News for nerds</description>
                    <items><rdf:Seq><rdf:li rdf:resource="https://slashdot.example/1"/></rdf:Seq></items>
                </channel>
                <image rdf:about="https://slashdot.example/logo.png">
                    <title>Logo</title>
                    <url>https://slashdot.example/logo.png</url>
                </image>
                <item rdf:about="https://slashdot.example/1">
                    <title>First story</title>
                    <link>https://slashdot.example/1</link>
                    <description>Story &lt;b&gt;text&lt;/b&gt;</description>
                    <dc:date>2020-01-02T10:00:00+00:00</dc:date>
                </item>
                <item rdf:about="https://slashdot.example/2">
                    <title>Undated</title>
                    <link>/2</link>
                </item>
            </rdf:RDF>"#,
        );

        assert_eq!(feed.name, "Slash");
        assert_eq!(feed.description, "News for nerds");
        assert_eq!(feed.homepage_link, "https://slashdot.example/");
        assert_eq!(feed.posts.len(), 2);
        assert_eq!(feed.posts[0].description, "Story text");
        assert_eq!(feed.posts[0].date, 1_577_959_200_000);
        assert_eq!(feed.posts[1].link, "https://slashdot.example/2");
        assert_eq!(feed.posts[1].date, NOW);
    }

    #[test]
    fn test_rss_090_namespace() {
        let feed = parse(
            r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                        xmlns="http://my.netscape.com/rdf/simple/0.9/">
                <channel><title>Old</title><link>https://old.example/</link></channel>
                <item><title>One</title><link>https://old.example/1</link></item>
            </rdf:RDF>"#,
        );
        assert_eq!(feed.name, "Old");
        assert_eq!(feed.posts[0].link, "https://old.example/1");
    }
}
