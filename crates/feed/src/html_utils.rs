// ABOUTME: HTML content extraction for feed content, summary, and description fields.
// ABOUTME: Finds the first image in a fragment and renders the fragment as compact plain text.

use once_cell::sync::Lazy;
use scraper::{Html, Node, Selector};

use crate::image_utils::is_tracking_image;
use crate::models::ExtractedHtmlContent;
use crate::text_utils::decode_url_encoded;

static IMG_SELECTOR: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("img").ok());

/// Elements whose text never reaches the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "iframe"];

/// Elements that separate words even when the markup has no whitespace.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt",
    "figcaption", "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr",
    "ul",
];

/// Inline elements that commonly leak into feed titles and names.
const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "big", "cite", "code", "del", "em", "font", "i", "img", "ins", "kbd",
    "mark", "q", "s", "small", "span", "strike", "strong", "sub", "sup", "u",
];

/// True when `s` contains an HTML tag or comment.
///
/// Only known HTML element names count, so text such as `Vec<T>` or
/// `a <b` is left alone.
pub fn has_html_markup(s: &str) -> bool {
    s.match_indices('<').any(|(at, _)| {
        let rest = &s[at + 1..];
        if rest.starts_with("!--") {
            return true;
        }
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        let name_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        let (name, after) = rest.split_at(name_len);
        let closes_name = after.starts_with(|c: char| c == '>' || c == '/' || c.is_whitespace());
        if name.is_empty() || !closes_name {
            return false;
        }
        let name = name.to_ascii_lowercase();
        [INLINE_ELEMENTS, BLOCK_ELEMENTS, HIDDEN_ELEMENTS]
            .iter()
            .any(|known| known.contains(&name.as_str()))
    })
}

/// Best-effort extractor over HTML fragments. Never fails: malformed markup
/// degrades to whatever html5ever recovers.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor {
    skip_tracking_images: bool,
}

impl HtmlExtractor {
    pub fn new(skip_tracking_images: bool) -> Self {
        Self {
            skip_tracking_images,
        }
    }

    /// Extracts the first image source and the plain-text content of `html`.
    pub fn extract(&self, html: &str) -> ExtractedHtmlContent {
        if !html.contains(['<', '&']) {
            return ExtractedHtmlContent {
                image_url: None,
                content: collapse_whitespace(html),
            };
        }

        let fragment = Html::parse_fragment(html);
        ExtractedHtmlContent {
            image_url: self.first_image(&fragment),
            content: plain_text(&fragment),
        }
    }

    /// First `<img>` in document order with a non-blank `src`.
    fn first_image(&self, fragment: &Html) -> Option<String> {
        let selector = IMG_SELECTOR.as_ref()?;
        fragment
            .select(selector)
            .filter_map(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(normalize_src)
            .find(|src| !self.skip_tracking_images || !is_tracking_image(src))
    }
}

/// Extracts image and text with the default policy (first image wins).
pub fn extract_html_content(html: &str) -> ExtractedHtmlContent {
    HtmlExtractor::default().extract(html)
}

/// Image proxies sometimes hand out fully percent-encoded absolute URLs.
fn normalize_src(src: &str) -> String {
    let lower = src.get(..8).unwrap_or(src).to_ascii_lowercase();
    if lower.starts_with("http%3a") || lower.starts_with("https%3a") {
        decode_url_encoded(src)
    } else {
        src.to_string()
    }
}

fn plain_text(fragment: &Html) -> String {
    let mut text = String::new();
    let mut stack = vec![(fragment.tree.root(), false)];

    while let Some((node, closing)) = stack.pop() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(element) => {
                let name = element.name();
                if HIDDEN_ELEMENTS.contains(&name) {
                    continue;
                }
                if BLOCK_ELEMENTS.contains(&name) {
                    text.push(' ');
                }
                if !closing {
                    stack.push((node, true));
                    stack.extend(node.children().rev().map(|child| (child, false)));
                }
            }
            _ => {
                if !closing {
                    stack.extend(node.children().rev().map(|child| (child, false)));
                }
            }
        }
    }

    collapse_whitespace(&text)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
