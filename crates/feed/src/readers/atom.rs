// ABOUTME: Streaming reader for Atom 1.0 (and Atom 0.3) feed documents.
// ABOUTME: Walks feed and entry scopes, disambiguating links by their rel attribute.

use tracing::trace;

use crate::error::FeedError;
use crate::models::FeedPayload;
use crate::readers::common::{
    clean_text_field, read_media, read_non_blank, ContentKind, FeedDraft, FirstWins, PostDraft,
    ReadContext,
};
use crate::readers::{vocabulary, Vocabulary, ATOM_03_NS, ATOM_NS};
use crate::text_utils::non_blank;
use crate::xml_cursor::{XmlCursor, XmlEvent};

const OWN: &[&str] = &[ATOM_NS, ATOM_03_NS];

/// Reads an Atom document. The cursor must be on the root `<feed>` start tag.
pub(crate) fn read_atom(
    cursor: &mut XmlCursor<'_>,
    ctx: &ReadContext<'_>,
) -> Result<FeedPayload, FeedError> {
    cursor.require(XmlEvent::StartTag, Some("feed"))?;
    let mut feed = FeedDraft::default();

    while cursor.next_child()? {
        if vocabulary(cursor, OWN) != Vocabulary::Own {
            cursor.skip()?;
            continue;
        }
        match cursor.local_name() {
            "title" => feed.title.offer(clean_text_field(&cursor.read_text()?)),
            "link" => read_link(cursor, &mut feed.link)?,
            "subtitle" | "tagline" => {
                feed.description.offer(clean_text_field(&cursor.read_text()?))
            }
            "entry" => feed.posts.push(read_entry(cursor, ctx)?),
            _ => cursor.skip()?,
        }
    }

    Ok(feed.finish(ctx))
}

fn read_entry(cursor: &mut XmlCursor<'_>, ctx: &ReadContext<'_>) -> Result<PostDraft, FeedError> {
    let mut post = PostDraft::default();

    while cursor.next_child()? {
        match vocabulary(cursor, OWN) {
            Vocabulary::Own => {}
            Vocabulary::Media => {
                read_media(cursor, &mut post)?;
                continue;
            }
            _ => {
                cursor.skip()?;
                continue;
            }
        }
        match cursor.local_name() {
            "title" => post.title.offer(clean_text_field(&cursor.read_text()?)),
            "link" => read_link(cursor, &mut post.link)?,
            "content" => {
                let raw = cursor.read_text()?;
                post.offer_content(ContentKind::Full, raw, &ctx.extractor);
            }
            "summary" => {
                let raw = cursor.read_text()?;
                post.offer_content(ContentKind::Summary, raw, &ctx.extractor);
            }
            "published" | "updated" | "issued" | "modified" => {
                post.date.offer(read_non_blank(cursor)?)
            }
            _ => cursor.skip()?,
        }
    }

    Ok(post)
}

/// Captures `href` from a primary link (`rel` absent, blank or `alternate`)
/// while the scope has no link yet; every other link is skipped.
fn read_link(cursor: &mut XmlCursor<'_>, slot: &mut FirstWins<String>) -> Result<(), FeedError> {
    if !slot.is_set() {
        let rel = cursor.attribute(None, "rel").map(str::trim).unwrap_or_default();
        if rel.is_empty() || rel.eq_ignore_ascii_case("alternate") {
            slot.offer(cursor.attribute(None, "href").and_then(non_blank));
        } else {
            trace!(rel, "skipping non-primary link");
        }
    }
    cursor.skip()
}
