//! Traits for reading word-list documents independently of where they live.

use std::{
    io::{BufRead, Cursor},
    path::Path,
};

use crate::{error::Error, normalize::read_text_file};

/// A document that can be parsed from a reader, a file, or an in-memory string.
///
/// # Example
///
/// ```rust,no_run
/// use oxtkit::traits::Parser;
/// use oxtkit::wordlist::PlainWordList;
///
/// let list = PlainWordList::read_from("words.txt")?;
/// println!("{} lines", list.lines.len());
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    ///
    /// The file is decoded first, so UTF-16 input with a BOM is accepted.
    /// Errors that the parser reports without a location are tagged with
    /// the path.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let path = path.as_ref();
        let text = read_text_file(path)?;
        Self::from_str(&text).map_err(|e| match e {
            Error::XmlParse(inner) => Error::input_format(path, inner.to_string()),
            Error::Io(inner) => Error::file_io(path, inner),
            Error::InputFormat { path: p, message } if p.as_os_str().is_empty() => {
                Error::input_format(path, message)
            }
            other => other,
        })
    }

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(s))
    }

    /// Parse from bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(bytes))
    }
}
