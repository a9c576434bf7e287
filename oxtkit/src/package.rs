//! The package pipeline: tag resolution, metadata, dictionary, archive.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{
    archive::{self, ArchiveBuilder, TimestampPolicy},
    encoder::{DictionaryEncoder, HunspellEncoder},
    error::Error,
    langtag::{self, Resolution, ResolvedTag},
    metadata::{self, DEFAULT_VERSION, MetadataBindings},
    template::{TemplateEngine, Templater},
    types::{FontBinding, ScriptType, Warning},
    wordlist::{DictType, DictionarySource, IngestStats},
};

/// Everything a package build needs besides the output location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOptions {
    /// Language tag as given; it may lack a region.
    pub langtag: String,
    /// Reject tags the registry cannot vouch for instead of warning.
    pub strict_langtag: bool,
    pub script_type: ScriptType,
    /// UI name of the language; the resolved tag when `None`.
    pub language: Option<String>,
    pub version: String,
    pub publisher: Option<String>,
    pub puburl: String,
    pub fonts: FontBinding,
    /// Punctuation that forms part of words.
    pub word_chars: String,
    pub dictionary: Option<PathBuf>,
    /// Dictionary format; inferred from the extension when `None`.
    pub dict_type: Option<DictType>,
    /// Extra affix data merged into the generated `.aff`.
    pub affix: Option<PathBuf>,
    pub timestamp: TimestampPolicy,
    /// Directory holding replacement metadata templates.
    pub resource_dir: Option<PathBuf>,
}

impl PackageOptions {
    /// Options for `langtag` with all defaults.
    pub fn new(langtag: impl Into<String>) -> Self {
        Self {
            langtag: langtag.into(),
            strict_langtag: false,
            script_type: ScriptType::default(),
            language: None,
            version: DEFAULT_VERSION.to_string(),
            publisher: None,
            puburl: String::new(),
            fonts: FontBinding::new(),
            word_chars: String::new(),
            dictionary: None,
            dict_type: None,
            affix: None,
            timestamp: TimestampPolicy::default(),
            resource_dir: None,
        }
    }

    pub fn with_strict_langtag(mut self, strict: bool) -> Self {
        self.strict_langtag = strict;
        self
    }

    pub fn with_script_type(mut self, script_type: ScriptType) -> Self {
        self.script_type = script_type;
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the publisher name and URL.
    pub fn with_publisher(mut self, publisher: Option<String>, puburl: impl Into<String>) -> Self {
        self.publisher = publisher;
        self.puburl = puburl.into();
        self
    }

    pub fn with_fonts(mut self, fonts: FontBinding) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_word_chars(mut self, word_chars: impl Into<String>) -> Self {
        self.word_chars = word_chars.into();
        self
    }

    /// Sets the dictionary input and, optionally, its format.
    pub fn with_dictionary(mut self, path: Option<PathBuf>, dict_type: Option<DictType>) -> Self {
        self.dictionary = path;
        self.dict_type = dict_type;
        self
    }

    pub fn with_affix(mut self, affix: Option<PathBuf>) -> Self {
        self.affix = affix;
        self
    }

    pub fn with_timestamp(mut self, timestamp: TimestampPolicy) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_resource_dir(mut self, resource_dir: Option<PathBuf>) -> Self {
        self.resource_dir = resource_dir;
        self
    }
}

/// Outcome of a build, for display or JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReport {
    /// The tag the package was built for.
    pub langtag: String,
    pub resolution: Resolution,
    /// Archive paths in archive order.
    pub entries: Vec<String>,
    /// Record counts; `None` without a dictionary or for hunspell pairs.
    pub word_stats: Option<IngestStats>,
    pub warnings: Vec<Warning>,
}

/// A package ready to be written.
#[derive(Debug, Clone)]
pub struct AssembledPackage {
    pub archive: ArchiveBuilder,
    pub report: PackageReport,
}

impl AssembledPackage {
    pub fn write_to_path(&self, path: &Path) -> Result<(), Error> {
        self.archive.write_to_path(path)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        self.archive.to_bytes()
    }
}

/// Assembles a package with the default template engine and encoder.
pub fn assemble(options: &PackageOptions) -> Result<AssembledPackage, Error> {
    let mut engine = Templater::new();
    assemble_with(options, &mut engine, |tag| {
        HunspellEncoder::new(tag.tag.as_str(), &options.word_chars)
    })
}

/// Assembles a package with the given template engine and an encoder built
/// for the resolved tag.
pub fn assemble_with<T, E, F>(
    options: &PackageOptions,
    engine: &mut T,
    make_encoder: F,
) -> Result<AssembledPackage, Error>
where
    T: TemplateEngine + ?Sized,
    E: DictionaryEncoder,
    F: FnOnce(&ResolvedTag) -> E,
{
    let mut archive = ArchiveBuilder::with_policy(options.timestamp)?;
    let mut warnings = Vec::new();

    let resolved = langtag::resolve(&options.langtag, options.strict_langtag)?;
    warnings.extend(resolved.warning());
    let tag = resolved.tag.to_string();
    tracing::debug!(input = %options.langtag, langtag = %tag, "resolved language tag");

    let bindings = MetadataBindings {
        langtag: tag.clone(),
        script_type: options.script_type,
        language: options.language.clone().unwrap_or_else(|| tag.clone()),
        version: options.version.clone(),
        publisher: options.publisher.clone(),
        puburl: options.puburl.clone(),
        fonts: options.fonts.clone(),
    };
    let documents = metadata::expand(&bindings, engine, options.resource_dir.as_deref())?;
    archive.add(archive::DICTIONARY_CONFIG_PATH, documents.dictionary_config)?;
    archive.add(archive::DESCRIPTION_PATH, documents.description)?;
    archive.add_fixed_entries()?;

    let mut word_stats = None;
    if let Some(path) = &options.dictionary {
        let source = DictionarySource::load(path, options.dict_type)?;
        let mut encoder = make_encoder(&resolved);
        let encoded = source.encode(&mut encoder, options.affix.as_deref())?;
        warnings.extend(encoded.warning());
        word_stats = encoded.stats;
        archive.add(archive::affix_path(&tag), encoded.affix)?;
        archive.add(archive::dictionary_path(&tag), encoded.dictionary)?;
    }

    let report = PackageReport {
        langtag: tag,
        resolution: resolved.resolution,
        entries: archive.manifest().paths(),
        word_stats,
        warnings,
    };
    Ok(AssembledPackage { archive, report })
}

/// Builds the package described by `options` and writes it to `outfile`.
pub fn build_package(options: &PackageOptions, outfile: &Path) -> Result<PackageReport, Error> {
    let package = assemble(options)?;
    package.write_to_path(outfile)?;
    Ok(package.report)
}
