// ABOUTME: Image candidate checks for post images.
// ABOUTME: Detects tracking pixels and recognizes image media types and file extensions.

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

/// Substrings indicating tracking pixels or spacer images (matched case-insensitively).
const TRACKING_PATTERNS: &[&str] = &[
    "pixel",
    "tracking",
    "analytics",
    "beacon",
    "spacer",
    "clear.gif",
    "blank.gif",
    "1x1",
    "data:image/gif;base64,r0lgodlhaqabai",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".webp", ".avif", ".bmp", ".svg",
];

static TRACKING_MATCHER: Lazy<Option<AhoCorasick>> = Lazy::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(TRACKING_PATTERNS)
        .ok()
});

/// Returns true when the URL looks like a tracking pixel rather than an image
/// worth showing.
pub fn is_tracking_image(url: &str) -> bool {
    if let Some(matcher) = TRACKING_MATCHER.as_ref() {
        if matcher.is_match(url) {
            return true;
        }
    }
    has_tiny_dimensions(&url.to_ascii_lowercase())
}

/// Checks query strings for 1x1 sizing parameters.
fn has_tiny_dimensions(url: &str) -> bool {
    let Some((_, query)) = url.split_once('?') else {
        return false;
    };
    query
        .split('&')
        .any(|pair| matches!(pair, "width=1" | "height=1" | "w=1" | "h=1"))
}

/// True for MIME types such as `image/png`.
pub fn is_image_mime(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

/// True when the URL path ends in a common image file extension.
pub fn has_image_extension(url: &str) -> bool {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_normal_images() {
        assert!(!is_tracking_image("https://example.com/image.jpg"));
        assert!(!is_tracking_image("https://cdn.example.com/uploads/header.webp?w=1200"));
    }

    #[test]
    fn test_rejects_tracking() {
        assert!(is_tracking_image("https://example.com/Tracking.gif"));
        assert!(is_tracking_image("https://example.com/pixel.png"));
        assert!(is_tracking_image("https://analytics.example.com/img.gif"));
        assert!(is_tracking_image("https://example.com/1x1.gif"));
        assert!(is_tracking_image("data:image/gif;base64,R0lGODlhAQABAIAAAP"));
    }

    #[test]
    fn test_rejects_tiny_dimensions() {
        assert!(is_tracking_image("https://example.com/img.gif?width=1&height=1"));
        assert!(is_tracking_image("https://example.com/img.gif?w=1&h=1"));
        assert!(!is_tracking_image("https://example.com/img.gif?w=100"));
    }

    #[test]
    fn test_image_mime_and_extension() {
        assert!(is_image_mime("image/jpeg"));
        assert!(is_image_mime(" IMAGE/PNG "));
        assert!(!is_image_mime("audio/mpeg"));
        assert!(has_image_extension("https://example.com/a.JPG?x=1"));
        assert!(!has_image_extension("https://example.com/episode.mp3"));
    }
}
