// ABOUTME: Text normalization for feed fields.
// ABOUTME: Entity decoding, whitespace cleanup, and percent-decoding of possibly encoded strings.

use percent_encoding::percent_decode_str;

/// Decodes HTML entities (named and numeric) to their character equivalents.
///
/// Unknown entities are left as-is.
pub fn decode_entities(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

/// Cleans a single-line text field such as a title or a feed name.
///
/// Decodes entities, collapses every whitespace run to one space and trims.
/// Returns `None` when nothing but whitespace remains.
pub fn clean_text(s: &str) -> Option<String> {
    let decoded = decode_entities(s);
    let mut result = String::with_capacity(decoded.len());
    let mut pending_space = false;

    for c in decoded.chars() {
        if c.is_whitespace() {
            pending_space = !result.is_empty();
        } else {
            if pending_space {
                result.push(' ');
                pending_space = false;
            }
            result.push(c);
        }
    }

    (!result.is_empty()).then_some(result)
}

/// Cleans body text destined for list previews.
///
/// Like [`clean_text`], but a whitespace run containing line breaks becomes a
/// single `\n`, so any number of blank lines or paragraph breaks end up as one
/// separator.
pub fn clean_text_compact(s: &str) -> Option<String> {
    let decoded = decode_entities(s);
    let mut result = String::with_capacity(decoded.len());
    let mut pending: Option<char> = None;

    for c in decoded.chars() {
        if c.is_whitespace() {
            if result.is_empty() {
                continue;
            }
            pending = match (pending, c) {
                (Some('\n'), _) | (_, '\n') | (_, '\r') => Some('\n'),
                _ => Some(' '),
            };
        } else {
            if let Some(separator) = pending.take() {
                result.push(separator);
            }
            result.push(c);
        }
    }

    (!result.is_empty()).then_some(result)
}

/// Percent-decodes a string that may or may not be URL-encoded.
///
/// Strings without a valid `%XX` escape are returned unchanged, so plain text
/// survives. Decoding happens once: a double-encoded string comes back
/// single-encoded. Input that decodes to invalid UTF-8 is returned unchanged.
pub fn decode_url_encoded(s: &str) -> String {
    if !has_percent_escape(s) {
        return s.to_string();
    }
    match percent_decode_str(s).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => s.to_string(),
    }
}

fn has_percent_escape(s: &str) -> bool {
    s.as_bytes().windows(3).any(|w| {
        w[0] == b'%' && w[1].is_ascii_hexdigit() && w[2].is_ascii_hexdigit()
    })
}

/// Returns the trimmed string, or `None` when it is blank.
pub(crate) fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_and_decodes() {
        assert_eq!(
            clean_text("  Tom &amp; Jerry\n\t go   home "),
            Some("Tom & Jerry go home".to_string())
        );
        assert_eq!(clean_text("&lt;b&gt;"), Some("<b>".to_string()));
    }

    #[test]
    fn test_clean_text_blank_is_none() {
        assert_eq!(clean_text(""), None);
        assert_eq!(clean_text(" \n\t "), None);
        assert_eq!(clean_text("&nbsp;"), None);
    }

    #[test]
    fn test_clean_text_compact_keeps_single_break() {
        assert_eq!(
            clean_text_compact("First  para.\n\n\n\n  Second\r\n\r\npara. "),
            Some("First para.\nSecond\npara.".to_string())
        );
        assert_eq!(clean_text_compact("\n\n"), None);
    }

    #[test]
    fn test_decode_url_encoded() {
        assert_eq!(
            decode_url_encoded("https%3A%2F%2Fexample.com%2Fa.png"),
            "https://example.com/a.png"
        );
        assert_eq!(decode_url_encoded("plain text"), "plain text");
        assert_eq!(decode_url_encoded("100% sure"), "100% sure");
        assert_eq!(decode_url_encoded("a%2520b"), "a%20b");
    }

    #[test]
    fn test_decode_url_encoded_invalid_utf8_unchanged() {
        assert_eq!(decode_url_encoded("bad%FFbyte"), "bad%FFbyte");
    }
}
