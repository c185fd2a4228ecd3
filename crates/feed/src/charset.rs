// ABOUTME: Character set handling for raw feed documents.
// ABOUTME: Transcodes non-UTF-8 documents to UTF-8 from the BOM, the XML declaration, or detection.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;

/// Returns the document as UTF-8 bytes, transcoding when it uses another
/// character set. UTF-8 input is returned as-is.
pub fn decode_document(data: &[u8]) -> Cow<'_, [u8]> {
    let encoding = detect_encoding(data);
    if encoding == UTF_8 {
        return Cow::Borrowed(data);
    }

    debug!(encoding = encoding.name(), "transcoding feed document");
    let (decoded, _, had_errors) = encoding.decode(data);
    if had_errors {
        debug!(encoding = encoding.name(), "document contains unmappable bytes");
    }
    Cow::Owned(decoded.into_owned().into_bytes())
}

/// BOM first, then the `encoding` pseudo-attribute of the XML declaration,
/// then detection for undeclared documents that are not valid UTF-8.
fn detect_encoding(data: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(data) {
        return encoding;
    }

    // A declaration readable as ASCII rules out the UTF-16 family, whatever
    // it claims.
    if let Some(encoding) = declared_encoding(data).filter(|e| e.is_ascii_compatible()) {
        return encoding;
    }

    if std::str::from_utf8(data).is_ok() {
        return UTF_8;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(data, true);
    detector.guess(None, true)
}

fn declared_encoding(data: &[u8]) -> Option<&'static Encoding> {
    let start = data.iter().position(|b| !b.is_ascii_whitespace())?;
    let mut reader = Reader::from_reader(&data[start..]);
    let Ok(Event::Decl(decl)) = reader.read_event() else {
        return None;
    };
    let label = decl.encoding()?.ok()?;
    Encoding::for_label(&label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn utf8(decoded: &Cow<'_, [u8]>) -> String {
        String::from_utf8(decoded.to_vec()).unwrap()
    }

    #[test]
    fn test_utf8_is_borrowed() {
        let data = "<?xml version=\"1.0\" encoding=\"UTF-8\"?><rss>Café</rss>".as_bytes();
        assert!(matches!(decode_document(data), Cow::Borrowed(_)));

        let undeclared = "<rss>naïve</rss>".as_bytes();
        assert!(matches!(decode_document(undeclared), Cow::Borrowed(_)));
    }

    #[test]
    fn test_declared_latin1() {
        let data = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><title>Caf\xE9</title>";
        let decoded = decode_document(data);
        assert_eq!(
            utf8(&decoded),
            "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><title>Café</title>"
        );
    }

    #[test]
    fn test_declared_windows_1252_single_quotes() {
        let data = b"\n  <?xml version='1.0' encoding='windows-1252'?><t>It\x92s \x80</t>";
        assert!(utf8(&decode_document(data)).ends_with("<t>It\u{2019}s \u{20ac}</t>"));
    }

    #[test]
    fn test_utf16_with_bom() {
        let text = "<?xml version=\"1.0\" encoding=\"UTF-16\"?><t>é</t>";
        let mut data = vec![0xFF, 0xFE];
        data.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
        assert_eq!(utf8(&decode_document(&data)), text);
    }

    #[test]
    fn test_bogus_utf16_declaration_ignored() {
        let data = b"<?xml version=\"1.0\" encoding=\"UTF-16\"?><t>plain</t>";
        assert!(matches!(decode_document(data), Cow::Borrowed(_)));
    }

    #[test]
    fn test_undeclared_legacy_bytes_are_detected() {
        let data = b"<rss><title>Caf\xE9 cr\xE8me br\xFBl\xE9e</title></rss>";
        let decoded = decode_document(data);
        assert!(matches!(decoded, Cow::Owned(_)));
        assert!(utf8(&decoded).starts_with("<rss><title>Caf"));
    }
}
