#![forbid(unsafe_code)]
//! Builds LibreOffice extension (`.oxt`) packages for spelling dictionaries
//! and language registration.
//!
//! A package is assembled from a language tag, optional font and publisher
//! metadata, and an optional word source: a hunspell `.aff`/`.dic` pair, an
//! annotated word-list XML file, or a plain word list. The archive is written
//! deterministically, so a fixed [`TimestampPolicy`] gives byte-stable output.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use oxtkit::{PackageOptions, ScriptType, build_package};
//! use std::path::{Path, PathBuf};
//!
//! let options = PackageOptions::new("az")
//!     .with_script_type(ScriptType::West)
//!     .with_dictionary(Some(PathBuf::from("words.txt")), None);
//! let report = build_package(&options, Path::new("az.oxt"))?;
//! for warning in &report.warnings {
//!     println!("{}", warning);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The crate also renders LDML locale files through document templates, see
//! [`ldml`].

pub mod archive;
pub mod encoder;
pub mod error;
pub mod langtag;
pub mod ldml;
pub mod metadata;
pub mod normalize;
pub mod package;
pub mod template;
pub mod traits;
pub mod types;
pub mod wordlist;

pub use crate::{
    archive::{ArchiveBuilder, PackageManifest, TimestampPolicy},
    encoder::{DictionaryEncoder, HunspellEncoder},
    error::Error,
    langtag::{LanguageTag, Resolution, ResolvedTag, analyse, resolve},
    ldml::{LdmlOptions, generate_ldml_document, render_ldml},
    package::{PackageOptions, PackageReport, assemble, assemble_with, build_package},
    template::{TemplateEngine, Templater},
    traits::Parser,
    types::{FontBinding, ScriptType, Warning, WordEntry},
    wordlist::{DictType, DictionarySource, IngestStats},
};
