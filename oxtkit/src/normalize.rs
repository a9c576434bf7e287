//! Text canonicalization for word-list and affix data.
//!
//! Everything that ends up inside a dictionary goes through here first: NFC
//! composition per line, then removal of every U+FEFF, not only a leading one.
//! Concatenated inputs routinely carry a BOM in the middle of the text.

use std::{fs::File, io::Read, path::Path};

use unicode_normalization::UnicodeNormalization;

use crate::error::Error;

/// The byte-order mark as it appears once decoded.
pub const BOM: char = '\u{FEFF}';

/// Normalizes a single piece of text to NFC and strips all BOM characters.
pub fn normalize_text(text: &str) -> String {
    text.nfc().filter(|c| *c != BOM).collect()
}

/// Normalizes each line to NFC and joins them with `\n`.
///
/// Lines are expected without their terminators; a trailing `\r` is kept as
/// part of the line because callers splitting with [`str::lines`] have
/// already removed it.
pub fn normalize_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let normalized: Vec<String> = lines
        .into_iter()
        .map(|line| normalize_text(line.as_ref()))
        .collect();
    normalized.join("\n")
}

/// Appends normalized affix data after normalized word data.
///
/// A single `\n` separates the two blocks unless the word content already
/// ends with one.
pub fn merge_normalized(words: &str, affix: Option<&str>) -> String {
    let mut merged = normalize_lines(words.lines());
    if words.ends_with('\n') && !merged.is_empty() {
        merged.push('\n');
    }
    if let Some(affix) = affix {
        if !merged.is_empty() && !merged.ends_with('\n') {
            merged.push('\n');
        }
        merged.push_str(&normalize_lines(affix.lines()));
        if affix.ends_with('\n') {
            merged.push('\n');
        }
    }
    merged
}

/// Reads a whole text file, decoding UTF-16 when a BOM announces it.
///
/// UTF-8 input is passed through unchanged, so invalid UTF-8 surfaces as an
/// error carrying the file path instead of being replaced.
pub fn read_text_file<P: AsRef<Path>>(path: P) -> Result<String, Error> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::file_io(path, e))?;
    let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
        .bom_override(true)
        .build(file);

    let mut decoded = String::new();
    decoder
        .read_to_string(&mut decoded)
        .map_err(|e| Error::file_io(path, e))?;
    Ok(decoded)
}

/// Reads a file and returns its lines normalized, joined with `\n`.
pub fn read_normalized<P: AsRef<Path>>(path: P) -> Result<String, Error> {
    let text = read_text_file(path)?;
    Ok(merge_normalized(&text, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_normalize_text_composes() {
        // "e" followed by a combining acute accent
        let decomposed = "cafe\u{0301}";
        assert_eq!(normalize_text(decomposed), "caf\u{00E9}");
    }

    #[test]
    fn test_normalize_text_strips_every_bom() {
        let text = "\u{FEFF}abc\u{FEFF}def\u{FEFF}";
        assert_eq!(normalize_text(text), "abcdef");
    }

    #[test]
    fn test_normalize_lines_joins_with_newline() {
        let out = normalize_lines(["\u{FEFF}one", "two", "thr\u{0065}\u{0301}"]);
        assert_eq!(out, "one\ntwo\nthr\u{00E9}");
    }

    #[test]
    fn test_merge_appends_affix_after_words() {
        let merged = merge_normalized("SET UTF-8\nTRY abc", Some("\u{FEFF}SFX A Y 1\n"));
        assert_eq!(merged, "SET UTF-8\nTRY abc\nSFX A Y 1\n");
    }

    #[test]
    fn test_merge_keeps_trailing_newline_once() {
        let merged = merge_normalized("a\nb\n", Some("c\n"));
        assert_eq!(merged, "a\nb\nc\n");
    }

    #[test]
    fn test_merge_without_affix() {
        assert_eq!(merge_normalized("x\r\ny", None), "x\ny");
        assert_eq!(merge_normalized("", None), "");
    }

    #[test]
    fn test_read_text_file_decodes_utf16() {
        let mut file = NamedTempFile::new().unwrap();
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "wörd".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        file.write_all(&bytes).unwrap();

        let text = read_text_file(file.path()).unwrap();
        assert_eq!(normalize_text(&text), "wörd");
    }

    #[test]
    fn test_read_text_file_rejects_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[b'o', b'k', 0xC3, 0x28]).unwrap();

        let err = read_text_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::FileIo { .. }));
    }

    #[test]
    fn test_read_text_file_missing() {
        let err = read_text_file("/nonexistent/words.txt").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/words.txt"));
    }
}
