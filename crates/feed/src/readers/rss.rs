// ABOUTME: Streaming reader for RSS 2.0 (and 0.9x) documents.
// ABOUTME: Also provides the channel and item readers reused by the RDF reader.

use crate::error::FeedError;
use crate::models::FeedPayload;
use crate::readers::common::{
    clean_text_field, is_image_media, read_media, read_non_blank, url_attribute, ContentKind,
    FeedDraft, PostDraft, ReadContext,
};
use crate::readers::{vocabulary, Vocabulary};
use crate::xml_cursor::{XmlCursor, XmlEvent};

/// Namespaces some RSS 2.0 publishers declare as the default namespace.
const OWN: &[&str] = &[
    "http://backend.userland.com/rss2",
    "http://blogs.law.harvard.edu/tech/rss",
];

/// Reads an RSS document. The cursor must be on the root `<rss>` start tag.
pub(crate) fn read_rss(
    cursor: &mut XmlCursor<'_>,
    ctx: &ReadContext<'_>,
) -> Result<FeedPayload, FeedError> {
    cursor.require(XmlEvent::StartTag, Some("rss"))?;
    let mut feed = FeedDraft::default();

    while cursor.next_child()? {
        match (vocabulary(cursor, OWN), cursor.local_name()) {
            (Vocabulary::Own, "channel") => read_channel(cursor, ctx, OWN, &mut feed)?,
            // RSS 0.9x places items next to the channel.
            (Vocabulary::Own, "item") => feed.posts.push(read_item(cursor, ctx, OWN)?),
            _ => cursor.skip()?,
        }
    }

    Ok(feed.finish(ctx))
}

/// Reads `<channel>` metadata into `feed`, collecting any items it contains.
pub(super) fn read_channel(
    cursor: &mut XmlCursor<'_>,
    ctx: &ReadContext<'_>,
    own: &[&str],
    feed: &mut FeedDraft,
) -> Result<(), FeedError> {
    while cursor.next_child()? {
        if vocabulary(cursor, own) != Vocabulary::Own {
            cursor.skip()?;
            continue;
        }
        match cursor.local_name() {
            "title" => feed.title.offer(clean_text_field(&cursor.read_text()?)),
            "link" => feed.link.offer(read_non_blank(cursor)?),
            "description" => feed.description.offer(clean_text_field(&cursor.read_text()?)),
            "item" => feed.posts.push(read_item(cursor, ctx, own)?),
            _ => cursor.skip()?,
        }
    }
    Ok(())
}

/// Reads one `<item>` into a draft, leaving the cursor on its end tag.
pub(super) fn read_item(
    cursor: &mut XmlCursor<'_>,
    ctx: &ReadContext<'_>,
    own: &[&str],
) -> Result<PostDraft, FeedError> {
    let mut post = PostDraft::default();

    while cursor.next_child()? {
        match (vocabulary(cursor, own), cursor.local_name()) {
            (Vocabulary::Own, "title") => post.title.offer(clean_text_field(&cursor.read_text()?)),
            (Vocabulary::Own, "link") => post.link.offer(read_non_blank(cursor)?),
            (Vocabulary::Own, "description") => {
                let raw = cursor.read_text()?;
                post.offer_content(ContentKind::Summary, raw, &ctx.extractor);
            }
            (Vocabulary::Content, "encoded") => {
                let raw = cursor.read_text()?;
                post.offer_content(ContentKind::Full, raw, &ctx.extractor);
            }
            (Vocabulary::Own, "pubDate" | "pubdate") | (Vocabulary::DublinCore, "date") => {
                post.date.offer(read_non_blank(cursor)?)
            }
            (Vocabulary::Own, "comments") => post.comments_link.offer(read_non_blank(cursor)?),
            (Vocabulary::Own, "guid") => read_guid(cursor, &mut post)?,
            (Vocabulary::Own, "enclosure") => {
                if is_image_media(cursor) {
                    post.media_image.offer(url_attribute(cursor));
                }
                cursor.skip()?;
            }
            (Vocabulary::Media, _) => read_media(cursor, &mut post)?,
            _ => cursor.skip()?,
        }
    }

    Ok(post)
}

/// A `guid` doubles as the link when it is a permalink to an http(s) page.
fn read_guid(cursor: &mut XmlCursor<'_>, post: &mut PostDraft) -> Result<(), FeedError> {
    let is_permalink = cursor
        .attribute(None, "isPermaLink")
        .map_or(true, |value| !value.trim().eq_ignore_ascii_case("false"));
    let guid = read_non_blank(cursor)?;
    if is_permalink {
        post.permalink.offer(guid.filter(|g| is_http_url(g)));
    }
    Ok(())
}

fn is_http_url(s: &str) -> bool {
    let lower = s.get(..8).unwrap_or(s).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
