// ABOUTME: Per-scope state shared by the Atom, RSS, and RDF readers.
// ABOUTME: First-wins slots, post/feed drafts, and their finalization into payloads.

use tracing::debug;

use crate::error::FeedError;
use crate::html_utils::{extract_html_content, has_html_markup, HtmlExtractor};
use crate::image_utils::{has_image_extension, is_image_mime};
use crate::models::{ExtractedHtmlContent, FeedPayload, PostPayload};
use crate::readers::{vocabulary, Vocabulary};
use crate::text_utils::{clean_text, clean_text_compact, non_blank};
use crate::time_parse::parse_date_millis;
use crate::url_utils::resolve_safe_url;
use crate::xml_cursor::{XmlCursor, XmlEvent};

/// Per-document inputs every reader needs.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReadContext<'a> {
    /// The caller-supplied URL the document was fetched from.
    pub source_url: &'a str,
    /// Fallback date for undated or unparseable entries.
    pub now_ms: i64,
    pub extractor: HtmlExtractor,
}

/// Optional slot that keeps the first value offered to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FirstWins<T>(Option<T>);

impl<T> Default for FirstWins<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> FirstWins<T> {
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Stores `value` unless the slot is already filled. `None` leaves the
    /// slot open for a later occurrence.
    pub fn offer(&mut self, value: Option<T>) {
        if self.0.is_none() {
            self.0 = value;
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

/// Which content field a captured text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContentKind {
    /// `atom:content`, `content:encoded`.
    Full,
    /// `atom:summary`, `description`.
    Summary,
}

#[derive(Debug, Clone)]
struct CapturedContent {
    raw: String,
    extracted: ExtractedHtmlContent,
}

impl CapturedContent {
    fn description(&self) -> String {
        if !self.extracted.content.trim().is_empty() {
            return self.extracted.content.clone();
        }
        clean_text_compact(&self.raw).unwrap_or_default()
    }
}

/// Everything a reader collected for one entry/item, before resolution.
#[derive(Debug, Default)]
pub(crate) struct PostDraft {
    pub title: FirstWins<String>,
    pub link: FirstWins<String>,
    /// A `guid` usable as the link when no `link` is declared.
    pub permalink: FirstWins<String>,
    pub date: FirstWins<String>,
    /// Image declared through enclosure/media elements.
    pub media_image: FirstWins<String>,
    pub comments_link: FirstWins<String>,
    content_image: FirstWins<String>,
    full: FirstWins<CapturedContent>,
    summary: FirstWins<CapturedContent>,
}

impl PostDraft {
    /// Captures a content field and runs it through the HTML extractor. The
    /// first field of each kind wins; the first extracted image is kept as a
    /// fallback for the direct media image.
    pub fn offer_content(&mut self, kind: ContentKind, raw: String, extractor: &HtmlExtractor) {
        let slot = match kind {
            ContentKind::Full => &mut self.full,
            ContentKind::Summary => &mut self.summary,
        };
        if slot.is_set() || raw.trim().is_empty() {
            return;
        }

        let extracted = extractor.extract(&raw);
        self.content_image.offer(extracted.image_url.clone());
        slot.offer(Some(CapturedContent { raw, extracted }));
    }

    /// Resolves the draft into a post, or `None` when the entry carries no
    /// usable link or neither a title nor a description.
    pub fn finish(self, homepage_link: &str, now_ms: i64) -> Option<PostPayload> {
        let candidate = self.link.into_inner().or(self.permalink.into_inner());
        let Some(link) = resolve_safe_url(Some(homepage_link), candidate.as_deref()) else {
            debug!(
                title = ?self.title.get(),
                link = ?candidate,
                "dropping entry without a resolvable link"
            );
            return None;
        };

        let title = self.title.into_inner().unwrap_or_default();
        let content = self.full.into_inner().or(self.summary.into_inner());
        let description = content
            .as_ref()
            .map(CapturedContent::description)
            .unwrap_or_default();
        if title.is_empty() && description.is_empty() {
            debug!(%link, "dropping entry without title and description");
            return None;
        }

        let image = self.media_image.into_inner().or(self.content_image.into_inner());
        let image_url = resolve_safe_url(Some(homepage_link), image.as_deref());

        let date = match self.date.into_inner() {
            Some(raw) => parse_date_millis(&raw).unwrap_or_else(|| {
                debug!(date = %raw, %link, "unparseable date, using current time");
                now_ms
            }),
            None => now_ms,
        };

        Some(PostPayload {
            link,
            title,
            description,
            raw_content: content.map(|c| c.raw),
            image_url,
            date,
            comments_link: self.comments_link.into_inner(),
        })
    }
}

/// Feed-level fields collected by a reader, plus its entry drafts in order.
#[derive(Debug, Default)]
pub(crate) struct FeedDraft {
    pub title: FirstWins<String>,
    pub link: FirstWins<String>,
    pub description: FirstWins<String>,
    pub posts: Vec<PostDraft>,
}

impl FeedDraft {
    /// Resolves the homepage link and every post against it. The icon is left
    /// empty for the dispatcher to fill.
    pub fn finish(self, ctx: &ReadContext<'_>) -> FeedPayload {
        let source = ctx.source_url.trim();
        let homepage_link = resolve_safe_url(Some(source), self.link.get().map(String::as_str))
            .unwrap_or_else(|| source.to_string());

        let declared = self.posts.len();
        let posts: Vec<PostPayload> = self
            .posts
            .into_iter()
            .filter_map(|post| post.finish(&homepage_link, ctx.now_ms))
            .collect();
        debug!(
            homepage = %homepage_link,
            posts = posts.len(),
            dropped = declared - posts.len(),
            "finished feed"
        );

        FeedPayload {
            name: self.title.into_inner().unwrap_or_else(|| source.to_string()),
            description: self.description.into_inner().unwrap_or_default(),
            icon: String::new(),
            homepage_link,
            link: source.to_string(),
            posts,
        }
    }
}

/// Cleans a text field that may carry leaked markup (titles, names, subtitles).
pub(crate) fn clean_text_field(raw: &str) -> Option<String> {
    if has_html_markup(raw) {
        clean_text(&extract_html_content(raw).content)
    } else {
        clean_text(raw)
    }
}

/// Reads the current element's text as a trimmed, non-blank string.
pub(crate) fn read_non_blank(cursor: &mut XmlCursor<'_>) -> Result<Option<String>, FeedError> {
    Ok(non_blank(&cursor.read_text()?))
}

/// Reads a Media RSS element (`thumbnail`, `content`, `group`) into the post's
/// direct image slot, leaving the cursor on its end tag.
///
/// Groups and contents are walked iteratively, so nesting depth is bounded
/// only by the document.
pub(crate) fn read_media(cursor: &mut XmlCursor<'_>, post: &mut PostDraft) -> Result<(), FeedError> {
    let depth = cursor.depth();
    offer_media_image(cursor, post);
    if !is_media_container(cursor) {
        return cursor.skip();
    }

    loop {
        match cursor.next()? {
            XmlEvent::StartTag if vocabulary(cursor, &[]) == Vocabulary::Media => {
                offer_media_image(cursor, post);
                if !is_media_container(cursor) {
                    cursor.skip()?;
                }
            }
            XmlEvent::StartTag => cursor.skip()?,
            XmlEvent::EndTag if cursor.depth() < depth => return Ok(()),
            XmlEvent::EndDocument => {
                return Err(FeedError::malformed("unexpected end of document"))
            }
            _ => {}
        }
    }
}

fn offer_media_image(cursor: &XmlCursor<'_>, post: &mut PostDraft) {
    match cursor.local_name() {
        "thumbnail" => post.media_image.offer(url_attribute(cursor)),
        "content" if is_image_media(cursor) => post.media_image.offer(url_attribute(cursor)),
        _ => {}
    }
}

fn is_media_container(cursor: &XmlCursor<'_>) -> bool {
    matches!(cursor.local_name(), "group" | "content")
}

/// True when an `enclosure`/`media:content` element points at an image.
pub(crate) fn is_image_media(cursor: &XmlCursor<'_>) -> bool {
    if let Some(medium) = cursor.attribute(None, "medium") {
        return medium.trim().eq_ignore_ascii_case("image");
    }
    match cursor.attribute(None, "type") {
        Some(mime) => is_image_mime(mime),
        None => cursor
            .attribute(None, "url")
            .is_some_and(has_image_extension),
    }
}

pub(crate) fn url_attribute(cursor: &XmlCursor<'_>) -> Option<String> {
    cursor.attribute(None, "url").and_then(non_blank)
}
