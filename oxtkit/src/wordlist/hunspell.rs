//! Pre-built hunspell affix/dictionary pairs, copied into the package as text.

use std::path::{Path, PathBuf};

use crate::{
    error::Error,
    normalize::{merge_normalized, read_normalized, read_text_file},
};

/// An `.aff` file and the `.dic` file next to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunspellPair {
    pub affix_path: PathBuf,
    pub dict_path: PathBuf,
}

impl HunspellPair {
    /// Pairs `affix_path` with the file of the same stem and a `.dic` extension.
    pub fn from_affix_path(affix_path: impl Into<PathBuf>) -> Self {
        let affix_path = affix_path.into();
        let dict_path = affix_path.with_extension("dic");
        HunspellPair {
            affix_path,
            dict_path,
        }
    }

    /// Normalized `.aff` content with `extra_affix` merged after it.
    pub fn affix_content(&self, extra_affix: Option<&Path>) -> Result<String, Error> {
        let affix = read_text_file(&self.affix_path)?;
        let extra = extra_affix.map(read_text_file).transpose()?;
        Ok(merge_normalized(&affix, extra.as_deref()))
    }

    /// Normalized `.dic` content.
    pub fn dictionary_content(&self) -> Result<String, Error> {
        read_normalized(&self.dict_path)
    }
}
