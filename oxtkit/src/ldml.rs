//! Rendering LDML locale data through a document template.

use std::{
    fs,
    path::{Path, PathBuf},
};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    error::Error,
    langtag::{self, TagAnalysis},
    template::{self, TemplateEngine, TemplateSource, Templater, XmlNode},
    traits::Parser,
};

/// Namespace declared as `xmlns:sil` on the context document root.
pub const SIL_NAMESPACE: &str = "urn://www.sil.org/ldml/0.1";

/// Written before the rendered template.
pub const OUTPUT_PROLOG: &str = "<?xml version='1.0'?>\n";

lazy_static! {
    static ref LDML_FILE_NAME: Regex = Regex::new(r"^([A-Za-z_-]+)\.xml$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdmlOptions {
    pub input: PathBuf,
    /// Template to render; the bundled `simple_ldml.fodt` when `None`.
    pub template: Option<PathBuf>,
    /// Tag describing the data; inferred from the input file name when `None`.
    pub langtag: Option<String>,
}

impl LdmlOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            template: None,
            langtag: None,
        }
    }

    pub fn with_template(mut self, template: Option<PathBuf>) -> Self {
        self.template = template;
        self
    }

    pub fn with_langtag(mut self, langtag: Option<String>) -> Self {
        self.langtag = langtag;
        self
    }

    fn template_source(&self) -> TemplateSource {
        match &self.template {
            Some(path) => TemplateSource::File(path.clone()),
            None => TemplateSource::Bundled(template::LDML_DOCUMENT_TEMPLATE),
        }
    }
}

/// The tag spelled by a file name such as `az_Latn.xml`.
pub fn infer_langtag(input: &Path) -> Option<String> {
    let name = input.file_name()?.to_str()?;
    LDML_FILE_NAME
        .captures(name)
        .and_then(|captures| captures.get(1))
        .map(|stem| stem.as_str().to_string())
}

/// The tag analysis to bind, if a tag is known.
///
/// An explicit tag that cannot be analysed is an error; a tag inferred from
/// the file name that cannot be analysed is skipped.
fn analysis_for(options: &LdmlOptions) -> Result<Option<TagAnalysis>, Error> {
    if let Some(tag) = &options.langtag {
        return langtag::analyse(tag).map(Some);
    }
    let Some(inferred) = infer_langtag(&options.input) else {
        return Ok(None);
    };
    match langtag::analyse(&inferred) {
        Ok(analysis) => Ok(Some(analysis)),
        Err(e) => {
            tracing::warn!(tag = %inferred, error = %e, "ignoring tag inferred from file name");
            Ok(None)
        }
    }
}

fn template_dir(source: &TemplateSource) -> String {
    match source {
        TemplateSource::Bundled(_) => template::RESOURCE_DIR.to_string(),
        TemplateSource::File(path) => {
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            fs::canonicalize(parent)
                .unwrap_or_else(|_| parent.to_path_buf())
                .display()
                .to_string()
        }
    }
}

/// Binds the generator variables on `engine`.
pub fn bind_variables<E: TemplateEngine + ?Sized>(
    engine: &mut E,
    repdir: &str,
    analysis: Option<&TagAnalysis>,
) {
    engine.define_variable("resdir", template::RESOURCE_DIR);
    engine.define_variable("repdir", repdir);
    if let Some(analysis) = analysis {
        engine.define_variable("lang", &analysis.lang);
        engine.define_variable("script", &analysis.script);
        engine.define_variable("lscript", &analysis.script.to_lowercase());
        engine.define_variable("region", &analysis.region);
    }
}

/// Renders the LDML file of `options` with `engine`, prolog included.
pub fn render_ldml_with<E: TemplateEngine + ?Sized>(
    options: &LdmlOptions,
    engine: &mut E,
) -> Result<String, Error> {
    let source = options.template_source();
    let analysis = analysis_for(options)?;
    bind_variables(engine, &template_dir(&source), analysis.as_ref());
    source.load(engine)?;

    let mut context = XmlNode::read_from(&options.input)?;
    context.set_attribute("xmlns:sil", SIL_NAMESPACE);
    tracing::debug!(
        input = %options.input.display(),
        root = %context.name,
        mode = ?source.render_mode(),
        "rendering LDML document"
    );

    let rendered = engine.render(source.render_mode(), Some(&context))?;
    Ok(format!("{}{}", OUTPUT_PROLOG, rendered))
}

/// Renders with the default [`Templater`].
pub fn render_ldml(options: &LdmlOptions) -> Result<String, Error> {
    render_ldml_with(options, &mut Templater::new())
}

/// Renders the LDML file of `options` and writes the result to `outfile`.
pub fn generate_ldml_document(options: &LdmlOptions, outfile: &Path) -> Result<(), Error> {
    let output = render_ldml(options)?;
    fs::write(outfile, output).map_err(|e| Error::file_io(outfile, e))?;
    tracing::info!(path = %outfile.display(), "wrote LDML document");
    Ok(())
}
