//! Template expansion for the XML documents shipped inside a package.
//!
//! The pipeline only talks to [`TemplateEngine`]; [`Templater`] is the
//! implementation used by default. See [`syntax`](self::syntax) for the
//! directive language it understands.

pub mod context;
mod engine;
pub(crate) mod syntax;

use std::path::{Path, PathBuf};

pub use context::XmlNode;
pub use engine::Templater;

use crate::{error::Error, normalize::read_text_file};

/// A callable bound into a template, e.g. `fonts(role)`.
///
/// It receives the evaluated arguments and returns the expansion, or a
/// message that the engine reports as a binding error.
pub type TemplateFunction = Box<dyn Fn(&[String]) -> Result<String, String>>;

/// Boxes a closure as a [`TemplateFunction`].
pub fn function<F>(f: F) -> TemplateFunction
where
    F: Fn(&[String]) -> Result<String, String> + 'static,
{
    Box::new(f)
}

/// How substituted values are written into the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Values are XML-escaped.
    Generic,
    /// Values are XML-escaped and line breaks and tabs become the ODF
    /// `<text:line-break/>` and `<text:tab/>` elements.
    Document,
}

impl RenderMode {
    /// Flat ODF documents (`.fodt`) render in document mode.
    pub fn for_template_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("fodt") => RenderMode::Document,
            _ => RenderMode::Generic,
        }
    }
}

/// Capability interface of a templating engine.
pub trait TemplateEngine {
    /// Binds a variable, replacing any earlier value.
    fn define_variable(&mut self, name: &str, value: &str);

    /// Registers `namespace:name(...)`, or `name(...)` when `namespace` is `None`.
    fn register_function(
        &mut self,
        namespace: Option<&str>,
        name: &str,
        function: TemplateFunction,
    );

    /// Loads the template to render next from a string.
    fn parse_str(&mut self, source: &str) -> Result<(), Error>;

    /// Loads the template to render next from a file.
    fn parse(&mut self, path: &Path) -> Result<(), Error> {
        let source = read_text_file(path)?;
        self.parse_str(&source)
    }

    fn render_generic(&self, context: Option<&XmlNode>) -> Result<String, Error>;

    fn render_document(&self, context: Option<&XmlNode>) -> Result<String, Error>;

    fn render(&self, mode: RenderMode, context: Option<&XmlNode>) -> Result<String, Error> {
        match mode {
            RenderMode::Generic => self.render_generic(context),
            RenderMode::Document => self.render_document(context),
        }
    }
}

/// Where a template comes from: compiled into the crate or a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Bundled(&'static str),
    File(PathBuf),
}

/// Directory of the templates shipped with the crate.
pub const RESOURCE_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

/// Spell-checker registration (`dictionaries.xcu`).
pub const DICTIONARY_CONFIG_TEMPLATE: &str = "dictxcu.xml";
/// Extension description (`description.xml`).
pub const DESCRIPTION_TEMPLATE: &str = "oxtdescription.xml";
/// Default template of the LDML document generator.
pub const LDML_DOCUMENT_TEMPLATE: &str = "simple_ldml.fodt";

/// Returns the embedded copy of a shipped template.
pub fn bundled(name: &str) -> Option<&'static str> {
    match name {
        DICTIONARY_CONFIG_TEMPLATE => Some(include_str!("../../data/dictxcu.xml")),
        DESCRIPTION_TEMPLATE => Some(include_str!("../../data/oxtdescription.xml")),
        LDML_DOCUMENT_TEMPLATE => Some(include_str!("../../data/simple_ldml.fodt")),
        _ => None,
    }
}

impl TemplateSource {
    /// The named template from `resource_dir`, or the bundled copy.
    pub fn named(name: &'static str, resource_dir: Option<&Path>) -> Self {
        match resource_dir {
            Some(dir) => TemplateSource::File(dir.join(name)),
            None => TemplateSource::Bundled(name),
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        match self {
            TemplateSource::Bundled(name) => RenderMode::for_template_path(Path::new(name)),
            TemplateSource::File(path) => RenderMode::for_template_path(path),
        }
    }

    /// Loads this template into `engine`.
    pub fn load<E: TemplateEngine + ?Sized>(&self, engine: &mut E) -> Result<(), Error> {
        match self {
            TemplateSource::Bundled(name) => {
                let source = bundled(name).ok_or_else(|| {
                    Error::TemplateBinding(format!("no bundled template named `{}`", name))
                })?;
                engine.parse_str(source)
            }
            TemplateSource::File(path) => engine.parse(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_mode_from_extension() {
        assert_eq!(
            RenderMode::for_template_path(Path::new("x/simple_ldml.fodt")),
            RenderMode::Document
        );
        assert_eq!(
            RenderMode::for_template_path(Path::new("x/dictxcu.xml")),
            RenderMode::Generic
        );
        assert_eq!(
            RenderMode::for_template_path(Path::new("noext")),
            RenderMode::Generic
        );
    }

    #[test]
    fn test_bundled_templates_exist() {
        for name in [
            DICTIONARY_CONFIG_TEMPLATE,
            DESCRIPTION_TEMPLATE,
            LDML_DOCUMENT_TEMPLATE,
        ] {
            let source = bundled(name).unwrap();
            assert!(syntax::parse(source).is_ok(), "{} does not parse", name);
        }
        assert!(bundled("missing.xml").is_none());
    }

    #[test]
    fn test_named_source() {
        assert_eq!(
            TemplateSource::named(DESCRIPTION_TEMPLATE, None),
            TemplateSource::Bundled(DESCRIPTION_TEMPLATE)
        );
        assert_eq!(
            TemplateSource::named(DESCRIPTION_TEMPLATE, Some(Path::new("/res"))),
            TemplateSource::File(PathBuf::from("/res/oxtdescription.xml"))
        );
        assert_eq!(
            TemplateSource::Bundled(LDML_DOCUMENT_TEMPLATE).render_mode(),
            RenderMode::Document
        );
    }
}
