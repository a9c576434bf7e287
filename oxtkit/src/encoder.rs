//! Writing word sets as hunspell dictionaries.
//!
//! The encoder emits the plain-text header of a hunspell `.aff` file and a
//! sorted `.dic` word list. It never derives affix flags; affix rules only
//! enter the output through [`DictionaryEncoder::merge_affix_file`].

use std::{
    collections::{BTreeSet, HashMap},
    path::Path,
};

use crate::{
    error::Error,
    normalize::{merge_normalized, normalize_text, read_text_file},
};

/// Capability interface of a dictionary encoder.
pub trait DictionaryEncoder {
    /// Registers one word. Empty words are ignored.
    fn add_word(&mut self, text: &str);

    /// Appends the content of an affix file to the affix data.
    fn merge_affix_file(&mut self, path: &Path) -> Result<(), Error>;

    fn affix_content(&self) -> String;

    fn dictionary_content(&self) -> String;
}

/// UTF-8 hunspell encoder.
#[derive(Debug, Clone, Default)]
pub struct HunspellEncoder {
    langtag: String,
    word_chars: String,
    words: BTreeSet<String>,
    affixes: Vec<String>,
}

impl HunspellEncoder {
    /// `word_chars` lists punctuation that forms part of words (`WORDCHARS`).
    pub fn new(langtag: &str, word_chars: &str) -> Self {
        Self {
            langtag: langtag.to_string(),
            word_chars: word_chars.to_string(),
            ..Self::default()
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    #[cfg(test)]
    fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Characters of all words, most frequent first, ties in code point order.
    fn try_chars(&self) -> String {
        let mut counts: HashMap<char, usize> = HashMap::new();
        for word in &self.words {
            for c in word.chars().filter(|c| !c.is_whitespace()) {
                *counts.entry(c).or_default() += 1;
            }
        }
        let mut chars: Vec<(char, usize)> = counts.into_iter().collect();
        chars.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        chars.into_iter().map(|(c, _)| c).collect()
    }
}

impl DictionaryEncoder for HunspellEncoder {
    fn add_word(&mut self, text: &str) {
        let normalized = normalize_text(text);
        let word = normalized.trim();
        if !word.is_empty() {
            self.words.insert(word.to_string());
        }
    }

    fn merge_affix_file(&mut self, path: &Path) -> Result<(), Error> {
        let content = read_text_file(path)?;
        self.affixes.push(merge_normalized(&content, None));
        Ok(())
    }

    fn affix_content(&self) -> String {
        let mut out = String::from("SET UTF-8\n");
        out.push_str(&format!("LANG {}\n", self.langtag));
        let try_chars = self.try_chars();
        if !try_chars.is_empty() {
            out.push_str(&format!("TRY {}\n", try_chars));
        }
        if !self.word_chars.is_empty() {
            out.push_str(&format!("WORDCHARS {}\n", self.word_chars));
        }
        for affix in &self.affixes {
            out.push('\n');
            out.push_str(affix);
            if !affix.ends_with('\n') {
                out.push('\n');
            }
        }
        out
    }

    fn dictionary_content(&self) -> String {
        let mut out = format!("{}\n", self.words.len());
        for word in &self.words {
            out.push_str(&word.replace('/', "\\/"));
            out.push('\n');
        }
        out
    }
}
