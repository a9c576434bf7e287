//! Plain newline-delimited word lists.

use std::io::BufRead;

use crate::{error::Error, normalize::normalize_text, traits::Parser, types::WordEntry};

/// One word per line. Lines are normalized and trimmed; blank lines are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlainWordList {
    pub lines: Vec<String>,
}

impl PlainWordList {
    /// Every line is a correct word.
    pub fn entries(&self) -> impl Iterator<Item = WordEntry> + '_ {
        self.lines.iter().map(|line| WordEntry::new(line, true))
    }
}

impl Parser for PlainWordList {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut lines = Vec::new();
        for line in reader.lines() {
            let normalized = normalize_text(&line?);
            let word = normalized.trim();
            if !word.is_empty() {
                lines.push(word.to_string());
            }
        }
        Ok(PlainWordList { lines })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_blank_lines_and_bom_are_dropped() {
        let list = PlainWordList::from_str("\u{FEFF}alpha\n\n  beta  \r\n\u{FEFF}\ngamma").unwrap();
        assert_eq!(list.lines, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_lines_are_composed() {
        let list = PlainWordList::from_str("cafe\u{301}\n").unwrap();
        assert_eq!(list.lines, vec!["caf\u{e9}"]);
        assert!(list.entries().all(|entry| entry.correct));
    }

    #[test]
    fn test_read_utf16_file() {
        let mut file = NamedTempFile::new().unwrap();
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "ev\nyol\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        file.write_all(&bytes).unwrap();

        let list = PlainWordList::read_from(file.path()).unwrap();
        assert_eq!(list.lines, vec!["ev", "yol"]);
    }

    #[test]
    fn test_invalid_utf8_bytes_fail() {
        assert!(PlainWordList::from_bytes(&[b'o', b'k', b'\n', 0xFF, 0xFE, b'x']).is_err());
    }
}
