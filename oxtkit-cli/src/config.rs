//! Optional TOML file with defaults for `oxtkit package`.
//!
//! ```toml
//! publisher = "SIL International"
//! puburl = "https://software.sil.org"
//! version = "1.2"
//! type = "ctl"
//! word = "-'"
//! strict_langtag = true
//! timestamp = "2024-01-01T00:00:00Z"
//! resdir = "templates"
//!
//! [fonts]
//! UI_SANS = "Noto Sans"
//! ```
//!
//! Flags given on the command line win over the file.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub publisher: Option<String>,
    pub puburl: Option<String>,
    pub version: Option<String>,
    /// Script type name (`west`, `asian`, `ctl`, `rtl`, `none`).
    #[serde(rename = "type")]
    pub script_type: Option<String>,
    /// Word-forming punctuation.
    pub word: Option<String>,
    /// Font role to family name.
    pub fonts: BTreeMap<String, String>,
    pub strict_langtag: Option<bool>,
    pub timestamp: Option<String>,
    pub resdir: Option<PathBuf>,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    /// The file at `path`, or an empty config when no path is given.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }
}
