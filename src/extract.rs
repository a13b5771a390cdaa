use std::path::Path;
use tracing::warn;

/// Turns raw document bytes into text. Implementations never fail: anything
/// they cannot read comes back as an empty string, which the scorer treats as
/// insufficient evidence.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, filename: &str, bytes: &[u8]) -> String;
}

impl<F> TextExtractor for F
where
    F: Fn(&str, &[u8]) -> String + Send + Sync,
{
    fn extract(&self, filename: &str, bytes: &[u8]) -> String {
        self(filename, bytes)
    }
}

/// Reads plain-text documents. Binary formats are left to other extractors.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

pub const PLAIN_TEXT_EXTENSIONS: &[&str] = &["txt", "md", "text"];

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, filename: &str, bytes: &[u8]) -> String {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension {
            Some(ext) if PLAIN_TEXT_EXTENSIONS.contains(&ext.as_str()) => {
                // invalid sequences are dropped, not replaced
                bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
            }
            other => {
                warn!(filename, extension = ?other, "unsupported document type, using empty text");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_decoded() {
        let text = PlainTextExtractor.extract("cv.TXT", b"Jane Doe\nRust");
        assert_eq!(text, "Jane Doe\nRust");
    }

    #[test]
    fn test_invalid_utf8_is_dropped() {
        let text = PlainTextExtractor.extract("cv.txt", b"Jane\xff Doe");
        assert_eq!(text, "Jane Doe");
    }

    #[test]
    fn test_replacement_characters_in_valid_text_survive() {
        let text = PlainTextExtractor.extract("cv.md", "a\u{FFFD}b".as_bytes());
        assert_eq!(text, "a\u{FFFD}b");

        let mut bytes = "Jos\u{FFFD}".as_bytes().to_vec();
        bytes.extend_from_slice(b"\xc3(");
        assert_eq!(PlainTextExtractor.extract("cv.txt", &bytes), "Jos\u{FFFD}(");
    }

    #[test]
    fn test_unsupported_types_yield_empty_text() {
        assert_eq!(PlainTextExtractor.extract("cv.pdf", b"%PDF-1.7"), "");
        assert_eq!(PlainTextExtractor.extract("cv", b"no extension"), "");
    }

    #[test]
    fn test_closures_are_extractors() {
        let upper = |_: &str, bytes: &[u8]| String::from_utf8_lossy(bytes).to_uppercase();
        assert_eq!(upper.extract("x", b"abc"), "ABC");
    }
}
