//! Binding package metadata into the configuration and description templates.

use std::path::Path;

use crate::{
    error::Error,
    template::{self, TemplateEngine, TemplateSource},
    types::{FontBinding, ScriptType},
};

/// Default extension version.
pub const DEFAULT_VERSION: &str = "0.1";

/// Values exposed to the metadata templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBindings {
    pub langtag: String,
    pub script_type: ScriptType,
    /// UI name of the language.
    pub language: String,
    pub version: String,
    pub publisher: Option<String>,
    pub puburl: String,
    pub fonts: FontBinding,
}

impl MetadataBindings {
    /// Bindings for `langtag` with every optional value at its default.
    pub fn new(langtag: &str) -> Self {
        Self {
            langtag: langtag.to_string(),
            script_type: ScriptType::default(),
            language: langtag.to_string(),
            version: DEFAULT_VERSION.to_string(),
            publisher: None,
            puburl: String::new(),
            fonts: FontBinding::new(),
        }
    }

    /// The variable table, in binding order. `resdir` is the directory the
    /// templates are loaded from.
    pub fn variables(&self, resdir: &str) -> Vec<(&'static str, String)> {
        let (publisher, puburl) = match &self.publisher {
            Some(publisher) => (publisher.clone(), self.puburl.clone()),
            None => (String::new(), String::new()),
        };
        vec![
            ("resdir", resdir.to_string()),
            ("langtag", self.langtag.clone()),
            ("scripttype", self.script_type.template_value().to_string()),
            ("language", self.language.clone()),
            ("version", self.version.clone()),
            ("publisher", publisher),
            ("puburl", puburl),
            ("fonttypes", self.fonts.font_types()),
        ]
    }

    /// Defines the variables and the `fonts(role)` function on `engine`.
    pub fn bind<E: TemplateEngine + ?Sized>(&self, engine: &mut E, resdir: &str) {
        for (name, value) in self.variables(resdir) {
            engine.define_variable(name, &value);
        }

        let fonts = self.fonts.clone();
        engine.register_function(
            None,
            "fonts",
            template::function(move |args| match args {
                [role] => fonts
                    .get(role)
                    .map(str::to_string)
                    .ok_or_else(|| format!("no font is bound to role `{}`", role)),
                _ => Err(format!("expected one role argument, got {}", args.len())),
            }),
        );
    }
}

/// The two documents generated from templates for every package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataDocuments {
    /// `dictionaries.xcu`
    pub dictionary_config: String,
    /// `description.xml`
    pub description: String,
}

/// Expands both metadata templates from `resource_dir`, or from the bundled
/// copies when it is `None`.
pub fn expand<E: TemplateEngine + ?Sized>(
    bindings: &MetadataBindings,
    engine: &mut E,
    resource_dir: Option<&Path>,
) -> Result<MetadataDocuments, Error> {
    let resdir = resource_dir
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|| template::RESOURCE_DIR.to_string());
    bindings.bind(engine, &resdir);

    let dictionary_config = render(
        engine,
        TemplateSource::named(template::DICTIONARY_CONFIG_TEMPLATE, resource_dir),
    )?;
    let description = render(
        engine,
        TemplateSource::named(template::DESCRIPTION_TEMPLATE, resource_dir),
    )?;
    tracing::debug!(langtag = %bindings.langtag, "expanded metadata templates");

    Ok(MetadataDocuments {
        dictionary_config,
        description,
    })
}

fn render<E: TemplateEngine + ?Sized>(engine: &mut E, source: TemplateSource) -> Result<String, Error> {
    source.load(engine)?;
    engine.render(source.render_mode(), None)
}
