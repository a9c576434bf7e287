//! All error types for the oxtkit crate.
//!
//! These are returned from every fallible operation (reading word lists,
//! resolving tags, expanding templates, writing the archive). None of them are
//! retried; each one aborts the build that raised it.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown dictionary type `{0}` (expected hunspell, pt, ptall or text)")]
    UnknownFormat(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid input in {}: {message}", path.display())]
    InputFormat { path: PathBuf, message: String },

    #[error("invalid language tag `{tag}`: {reason}")]
    InvalidLangTag { tag: String, reason: String },

    #[error("invalid font binding `{0}` (expected ROLE=Family Name)")]
    InvalidFontBinding(String),

    #[error("template binding error: {0}")]
    TemplateBinding(String),

    #[error("template syntax error at byte {offset}: {message}")]
    TemplateSyntax { offset: usize, message: String },

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error on {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("duplicate archive entry `{0}`")]
    DuplicateEntry(String),

    #[error("invalid timestamp: {0}")]
    Timestamp(String),
}

impl Error {
    /// Wraps an I/O error with the path it happened on.
    pub fn file_io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::FileIo {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates an input format error for the given file.
    pub fn input_format(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Error::InputFormat {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Creates an invalid language tag error.
    pub fn invalid_lang_tag(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidLangTag {
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    /// Creates a template syntax error at a byte offset of the template source.
    pub fn template_syntax(offset: usize, message: impl Into<String>) -> Self {
        Error::TemplateSyntax {
            offset,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_unknown_format_error() {
        let error = Error::UnknownFormat("wordperfect".to_string());
        assert_eq!(
            error.to_string(),
            "unknown dictionary type `wordperfect` (expected hunspell, pt, ptall or text)"
        );
    }

    #[test]
    fn test_input_format_error_names_path() {
        let error = Error::input_format("/tmp/words.xml", "item without `word`");
        assert_eq!(
            error.to_string(),
            "invalid input in /tmp/words.xml: item without `word`"
        );
    }

    #[test]
    fn test_invalid_lang_tag_names_tag() {
        let error = Error::invalid_lang_tag("zz-!!", "not a BCP 47 tag");
        assert!(error.to_string().contains("zz-!!"));
        assert!(error.to_string().contains("not a BCP 47 tag"));
    }

    #[test]
    fn test_file_io_error_names_path() {
        let source = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = Error::file_io("missing.aff", source);
        let display = error.to_string();
        assert!(display.contains("missing.aff"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_template_syntax_error() {
        let error = Error::template_syntax(42, "unterminated `${`");
        assert_eq!(
            error.to_string(),
            "template syntax error at byte 42: unterminated `${`"
        );
    }

    #[test]
    fn test_error_debug() {
        let error = Error::DuplicateEntry("description.xml".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("DuplicateEntry"));
        assert!(debug.contains("description.xml"));
    }
}
