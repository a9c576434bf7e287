//! Core value types shared by the package pipeline.

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::Serialize;

use crate::{error::Error, normalize::normalize_text};

/// One word headed for the dictionary encoder.
///
/// `text` is always NFC without any byte-order mark; [`WordEntry::new`] is
/// the only constructor and enforces that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct WordEntry {
    text: String,
    /// Whether the source classified the word as correctly spelled.
    pub correct: bool,
}

impl WordEntry {
    pub fn new(text: &str, correct: bool) -> Self {
        Self {
            text: normalize_text(text),
            correct,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Coarse script category that drives language registration in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptType {
    #[default]
    West,
    Asian,
    Ctl,
    Rtl,
    /// The host already knows the language; nothing is registered.
    None,
}

impl ScriptType {
    /// Looks a script type up by name, ignoring case.
    ///
    /// Unrecognized names fall back to [`ScriptType::West`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "asian" => ScriptType::Asian,
            "ctl" => ScriptType::Ctl,
            "rtl" => ScriptType::Rtl,
            "none" => ScriptType::None,
            _ => ScriptType::West,
        }
    }

    /// The value bound to the `scripttype` template variable.
    pub fn template_value(&self) -> &'static str {
        match self {
            ScriptType::West => "1",
            ScriptType::Asian => "2",
            ScriptType::Ctl => "3",
            ScriptType::Rtl => "4",
            ScriptType::None => "",
        }
    }
}

impl Display for ScriptType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptType::West => write!(f, "west"),
            ScriptType::Asian => write!(f, "asian"),
            ScriptType::Ctl => write!(f, "ctl"),
            ScriptType::Rtl => write!(f, "rtl"),
            ScriptType::None => write!(f, "none"),
        }
    }
}

/// Semantic font roles (e.g. `UI_SANS`) bound to concrete family names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FontBinding {
    fonts: BTreeMap<String, String>,
}

impl FontBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a role to a family. A role bound twice keeps the last family.
    pub fn insert(&mut self, role: impl Into<String>, family: impl Into<String>) {
        self.fonts.insert(role.into(), family.into());
    }

    pub fn get(&self, role: &str) -> Option<&str> {
        self.fonts.get(role).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Role names, sorted.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }

    /// Sorted role names joined with single spaces (the `fonttypes` value).
    pub fn font_types(&self) -> String {
        self.roles().collect::<Vec<_>>().join(" ")
    }

    /// Parses one `ROLE=Family Name` assignment.
    pub fn parse_assignment(assignment: &str) -> Result<(String, String), Error> {
        let (role, family) = assignment
            .split_once('=')
            .ok_or_else(|| Error::InvalidFontBinding(assignment.to_string()))?;
        let role = role.trim();
        let family = family.trim().trim_matches('"');
        if role.is_empty() || family.is_empty() {
            return Err(Error::InvalidFontBinding(assignment.to_string()));
        }
        Ok((role.to_string(), family.to_string()))
    }
}

impl FromIterator<(String, String)> for FontBinding {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut binding = FontBinding::new();
        for (role, family) in iter {
            binding.insert(role, family);
        }
        binding
    }
}

impl FromStr for FontBinding {
    type Err = Error;

    /// Parses `ROLE=Family` assignments separated by `;`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(FontBinding::parse_assignment)
            .collect()
    }
}

/// Advisory conditions raised while building; none of them stop the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A tag without region was replaced by a registry entry.
    RegionCoerced { from: String, to: String },
    /// The tag is neither regional nor known to be region-free.
    UnverifiedTag { tag: String },
    /// Fewer than a quarter of the annotated records were accepted.
    LowAcceptance { accepted: usize, total: usize },
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::RegionCoerced { from, to } => {
                write!(f, "Can't have unregioned tag {}, using {} instead.", from, to)
            }
            Warning::UnverifiedTag { tag } => write!(
                f,
                "Language tag {} is not in the tag registry; using it unchanged.",
                tag
            ),
            Warning::LowAcceptance { accepted, total } => {
                let percent = if *total == 0 {
                    0.0
                } else {
                    (*accepted as f64) * 100.0 / (*total as f64)
                };
                write!(
                    f,
                    "Only {:.0}% of the words are marked as correct and entered into the dictionary. Consider using --dicttype ptall",
                    percent
                )
            }
        }
    }
}
