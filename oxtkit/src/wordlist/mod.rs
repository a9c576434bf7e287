//! Dictionary sources and their ingestion into a [`DictionaryEncoder`].
//!
//! A build takes at most one dictionary input. [`DictType`] is the user-facing
//! selector; [`DictionarySource::load`] resolves it once into the variant that
//! drives the rest of the build.

pub mod annotated;
pub mod hunspell;
pub mod plain;

use std::{
    fmt::{Display, Formatter},
    path::Path,
    str::FromStr,
};

use serde::Serialize;

pub use annotated::AnnotatedWordList;
pub use hunspell::HunspellPair;
pub use plain::PlainWordList;

use crate::{
    encoder::DictionaryEncoder,
    error::Error,
    traits::Parser,
    types::{Warning, WordEntry},
};

/// Dictionary input formats accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DictType {
    /// An `.aff` file with its `.dic` next to it.
    Hunspell,
    /// Annotated word-list XML; only records marked correct are used.
    Pt,
    /// Annotated word-list XML; every record is used.
    PtAll,
    /// One word per line.
    Text,
}

impl Display for DictType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DictType::Hunspell => write!(f, "hunspell"),
            DictType::Pt => write!(f, "pt"),
            DictType::PtAll => write!(f, "ptall"),
            DictType::Text => write!(f, "text"),
        }
    }
}

/// Accepts `hunspell`, `pt`, `ptall` and `text`, case-insensitively.
///
/// Returns [`Error::UnknownFormat`] for anything else.
impl FromStr for DictType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hunspell" => Ok(DictType::Hunspell),
            "pt" => Ok(DictType::Pt),
            "ptall" => Ok(DictType::PtAll),
            "text" => Ok(DictType::Text),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

impl DictType {
    /// Infers the type from the file extension: `.aff`, `.xml` or `.txt`.
    pub fn infer_from_path(path: &Path) -> Result<Self, Error> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("aff") => Ok(DictType::Hunspell),
            Some("xml") => Ok(DictType::Pt),
            Some("txt") => Ok(DictType::Text),
            _ => Err(Error::UnsupportedFormat(format!(
                "cannot infer the dictionary type of {}; use --dicttype",
                path.display()
            ))),
        }
    }

    /// The acceptance policy for annotated word lists.
    pub fn accept_policy(&self) -> AcceptPolicy {
        match self {
            DictType::PtAll => AcceptPolicy::AcceptAll,
            _ => AcceptPolicy::CorrectOnly,
        }
    }
}

/// Which annotated records make it into the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptPolicy {
    CorrectOnly,
    AcceptAll,
}

impl AcceptPolicy {
    pub fn accepts(&self, entry: &WordEntry) -> bool {
        match self {
            AcceptPolicy::CorrectOnly => entry.correct,
            AcceptPolicy::AcceptAll => true,
        }
    }
}

/// Record counts of a word-list ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct IngestStats {
    /// Records read from the source.
    pub item_count: usize,
    /// Records handed to the encoder.
    pub word_count: usize,
}

impl IngestStats {
    /// True when fewer than a quarter of the records were accepted.
    pub fn low_acceptance(&self) -> bool {
        self.word_count * 4 < self.item_count
    }

    pub fn warning(&self) -> Option<Warning> {
        self.low_acceptance().then_some(Warning::LowAcceptance {
            accepted: self.word_count,
            total: self.item_count,
        })
    }
}

/// The accepted words of a word-list source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested {
    pub words: Vec<WordEntry>,
    pub stats: IngestStats,
}

/// Finished `.aff` and `.dic` contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDictionary {
    pub affix: String,
    pub dictionary: String,
    /// `None` for hunspell pairs, which are copied without reading words.
    pub stats: Option<IngestStats>,
}

impl EncodedDictionary {
    pub fn warning(&self) -> Option<Warning> {
        self.stats.as_ref().and_then(IngestStats::warning)
    }
}

/// The dictionary input of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionarySource {
    HunspellPair(HunspellPair),
    AnnotatedWordList {
        list: AnnotatedWordList,
        policy: AcceptPolicy,
    },
    PlainWordList(PlainWordList),
}

impl DictionarySource {
    /// Reads the dictionary at `path`, as `dict_type` or as inferred from its
    /// extension.
    pub fn load(path: &Path, dict_type: Option<DictType>) -> Result<Self, Error> {
        let dict_type = match dict_type {
            Some(dict_type) => dict_type,
            None => DictType::infer_from_path(path)?,
        };
        tracing::debug!(path = %path.display(), %dict_type, "loading dictionary source");

        Ok(match dict_type {
            DictType::Hunspell => DictionarySource::HunspellPair(HunspellPair::from_affix_path(path)),
            DictType::Pt | DictType::PtAll => DictionarySource::AnnotatedWordList {
                list: AnnotatedWordList::read_from(path)?,
                policy: dict_type.accept_policy(),
            },
            DictType::Text => DictionarySource::PlainWordList(PlainWordList::read_from(path)?),
        })
    }

    /// The accepted words, or `None` for a hunspell pair.
    pub fn ingest(&self) -> Option<Ingested> {
        match self {
            DictionarySource::HunspellPair(_) => None,
            DictionarySource::AnnotatedWordList { list, policy } => {
                Some(ingest_annotated(list, *policy))
            }
            DictionarySource::PlainWordList(list) => Some(ingest_plain(list)),
        }
    }

    /// Produces the `.aff` and `.dic` contents, merging `affix` into the
    /// affix data after all words are registered.
    pub fn encode<E: DictionaryEncoder + ?Sized>(
        &self,
        encoder: &mut E,
        affix: Option<&Path>,
    ) -> Result<EncodedDictionary, Error> {
        let Ingested { words, stats } = match self {
            DictionarySource::HunspellPair(pair) => {
                return Ok(EncodedDictionary {
                    affix: pair.affix_content(affix)?,
                    dictionary: pair.dictionary_content()?,
                    stats: None,
                });
            }
            DictionarySource::AnnotatedWordList { list, policy } => {
                ingest_annotated(list, *policy)
            }
            DictionarySource::PlainWordList(list) => ingest_plain(list),
        };

        for word in &words {
            encoder.add_word(word.text());
        }
        if let Some(affix) = affix {
            encoder.merge_affix_file(affix)?;
        }
        tracing::debug!(
            items = stats.item_count,
            words = stats.word_count,
            "encoded word list"
        );

        Ok(EncodedDictionary {
            affix: encoder.affix_content(),
            dictionary: encoder.dictionary_content(),
            stats: Some(stats),
        })
    }
}

fn ingest_annotated(list: &AnnotatedWordList, policy: AcceptPolicy) -> Ingested {
    let words: Vec<WordEntry> = list
        .items
        .iter()
        .filter(|item| policy.accepts(item))
        .cloned()
        .collect();
    let stats = IngestStats {
        item_count: list.len(),
        word_count: words.len(),
    };
    Ingested { words, stats }
}

fn ingest_plain(list: &PlainWordList) -> Ingested {
    let words: Vec<WordEntry> = list.entries().collect();
    let stats = IngestStats {
        item_count: words.len(),
        word_count: words.len(),
    };
    Ingested { words, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::HunspellEncoder;
    use std::{fmt::Write as _, fs};
    use tempfile::tempdir;

    fn annotated(total: usize, correct: usize) -> String {
        let mut xml = String::from("<wordlist>");
        for i in 0..total {
            let spelling = if i < correct { "Correct" } else { "Incorrect" };
            write!(xml, r#"<item word="w{}" spelling="{}"/>"#, i, spelling).unwrap();
        }
        xml.push_str("</wordlist>");
        xml
    }

    #[test]
    fn test_dict_type_from_str() {
        assert_eq!("ptall".parse::<DictType>().unwrap(), DictType::PtAll);
        assert_eq!(" Hunspell ".parse::<DictType>().unwrap(), DictType::Hunspell);
        assert!(matches!(
            "myspell".parse::<DictType>(),
            Err(Error::UnknownFormat(name)) if name == "myspell"
        ));
        assert_eq!(DictType::PtAll.to_string(), "ptall");
    }

    #[test]
    fn test_infer_from_path() {
        assert_eq!(DictType::infer_from_path(Path::new("a/b.aff")).unwrap(), DictType::Hunspell);
        assert_eq!(DictType::infer_from_path(Path::new("b.XML")).unwrap(), DictType::Pt);
        assert_eq!(DictType::infer_from_path(Path::new("b.txt")).unwrap(), DictType::Text);
        let err = DictType::infer_from_path(Path::new("words.csv")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
        assert!(err.to_string().contains("words.csv"));
    }

    #[test]
    fn test_low_acceptance_threshold() {
        let list = AnnotatedWordList::from_str(&annotated(100, 20)).unwrap();
        let source = DictionarySource::AnnotatedWordList {
            list,
            policy: AcceptPolicy::CorrectOnly,
        };
        let ingested = source.ingest().unwrap();
        assert_eq!(ingested.words.len(), 20);
        assert_eq!(
            ingested.stats.warning(),
            Some(Warning::LowAcceptance {
                accepted: 20,
                total: 100
            })
        );

        let list = AnnotatedWordList::from_str(&annotated(100, 30)).unwrap();
        let stats = DictionarySource::AnnotatedWordList {
            list,
            policy: AcceptPolicy::CorrectOnly,
        }
        .ingest()
        .unwrap()
        .stats;
        assert_eq!(stats.word_count, 30);
        assert_eq!(stats.warning(), None);
    }

    #[test]
    fn test_accept_all_takes_every_record() {
        let list = AnnotatedWordList::from_str(&annotated(10, 1)).unwrap();
        let source = DictionarySource::AnnotatedWordList {
            list,
            policy: AcceptPolicy::AcceptAll,
        };
        let stats = source.ingest().unwrap().stats;
        assert_eq!(stats.word_count, 10);
        assert!(!stats.low_acceptance());
    }

    #[test]
    fn test_load_infers_and_encodes() {
        let dir = tempdir().unwrap();
        let words = dir.path().join("words.txt");
        fs::write(&words, "ev\nyol\n\nev\n").unwrap();

        let source = DictionarySource::load(&words, None).unwrap();
        assert!(matches!(source, DictionarySource::PlainWordList(_)));

        let mut encoder = HunspellEncoder::new("az-AZ", "");
        let encoded = source.encode(&mut encoder, None).unwrap();
        assert_eq!(encoded.dictionary, "2\nev\nyol\n");
        assert_eq!(
            encoded.stats,
            Some(IngestStats {
                item_count: 3,
                word_count: 3
            })
        );
        assert_eq!(encoded.warning(), None);
    }

    #[test]
    fn test_hunspell_pair_bypasses_encoder() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("xx.aff"), "SET UTF-8\n").unwrap();
        fs::write(dir.path().join("xx.dic"), "1\nword\n").unwrap();

        let source = DictionarySource::load(&dir.path().join("xx.aff"), None).unwrap();
        let mut encoder = HunspellEncoder::new("xx", "");
        let encoded = source.encode(&mut encoder, None).unwrap();
        assert_eq!(encoded.affix, "SET UTF-8\n");
        assert_eq!(encoded.dictionary, "1\nword\n");
        assert_eq!(encoded.stats, None);
        assert_eq!(encoder.word_count(), 0);
    }

    #[test]
    fn test_explicit_type_overrides_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("list.dat");
        fs::write(&path, annotated(4, 1)).unwrap();

        let source = DictionarySource::load(&path, Some(DictType::PtAll)).unwrap();
        assert_eq!(source.ingest().unwrap().stats.word_count, 4);
    }
}
