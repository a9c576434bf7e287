//! Word-list XML with per-item correctness annotations.
//!
//! Every `item` element in the document is a record, wherever it is nested:
//!
//! ```xml
//! <wordlist>
//!   <item word="kitab" spelling="Correct"/>
//!   <item word="ktab" spelling="Incorrect"/>
//! </wordlist>
//! ```

use std::{io::BufRead, path::PathBuf};

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::{error::Error, traits::Parser, types::WordEntry};

/// The `spelling` value that marks a record as correct.
pub const CORRECT_SPELLING: &str = "Correct";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnotatedWordList {
    pub items: Vec<WordEntry>,
}

impl AnnotatedWordList {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    fn correct_count(&self) -> usize {
        self.items.iter().filter(|item| item.correct).count()
    }
}

fn parse_item(e: &BytesStart, index: usize) -> Result<WordEntry, Error> {
    let mut word = None;
    let mut spelling = None;
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::input_format(PathBuf::new(), e.to_string()))?;
        match attr.key.local_name().as_ref() {
            b"word" => word = Some(attr.unescape_value()?.to_string()),
            b"spelling" => spelling = Some(attr.unescape_value()?.to_string()),
            _ => {}
        }
    }

    let word = word.ok_or_else(|| {
        Error::input_format(
            PathBuf::new(),
            format!("item #{} has no `word` attribute", index + 1),
        )
    })?;
    let correct = spelling.as_deref() == Some(CORRECT_SPELLING);
    Ok(WordEntry::new(&word, correct))
}

impl Parser for AnnotatedWordList {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut items = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                    if e.local_name().as_ref() == b"item" =>
                {
                    let item = parse_item(e, items.len())?;
                    items.push(item);
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(Error::XmlParse(e)),
            }
            buf.clear();
        }
        Ok(AnnotatedWordList { items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_items_at_any_depth() {
        let xml = indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <wordlist>
              <item word="alma" spelling="Correct"/>
              <group>
                <item word="armud" spelling="Incorrect"></item>
                <sub><item word="heyva" spelling="Correct"/></sub>
              </group>
              <notitem word="x" spelling="Correct"/>
            </wordlist>
        "#};
        let list = AnnotatedWordList::from_str(xml).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.correct_count(), 2);
        assert_eq!(list.items[1].text(), "armud");
        assert!(!list.items[1].correct);
    }

    #[test]
    fn test_missing_spelling_is_not_correct() {
        let list = AnnotatedWordList::from_str(r#"<w><item word="a"/></w>"#).unwrap();
        assert_eq!(list.correct_count(), 0);
    }

    #[test]
    fn test_words_are_normalized() {
        let list =
            AnnotatedWordList::from_str("<w><item word=\"\u{FEFF}cafe\u{301}\" spelling=\"Correct\"/></w>")
                .unwrap();
        assert_eq!(list.items[0].text(), "caf\u{e9}");
    }

    #[test]
    fn test_missing_word_names_the_file() {
        let mut file = NamedTempFile::with_suffix(".xml").unwrap();
        write!(file, r#"<w><item spelling="Correct"/></w>"#).unwrap();

        let err = AnnotatedWordList::read_from(file.path()).unwrap_err();
        match &err {
            Error::InputFormat { path, message } => {
                assert_eq!(path, file.path());
                assert!(message.contains("word"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_xml_fails() {
        assert!(AnnotatedWordList::from_str("<w><item word='a'></w>").is_err());
    }
}
