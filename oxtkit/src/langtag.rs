//! Language tag parsing, regionalization against the tag registry, and
//! maximal tag analysis.
//!
//! LibreOffice wants dictionaries registered under a regional tag (`az-AZ`,
//! not `az`) unless the language is one it handles without a region. The
//! registry below lists, in lookup order, the regional tag picked for each
//! bare language, followed by the languages known to need no region.

use std::{
    collections::HashSet,
    fmt::{Display, Formatter},
    str::FromStr,
};

use lazy_static::lazy_static;
use serde::Serialize;
use unic_langid::LanguageIdentifier;

use crate::{error::Error, types::Warning};

/// Fully regionalized tags, searched in this order for a bare language.
pub const REGIONAL_TAGS: &[&str] = &[
    "af-ZA", "ak-GH", "am-ET", "an-ES", "apt-IN", "arn-CL", "as-IN", "ast-ES", "axk-CF", "av-RU",
    "az-AZ", "ba-RU", "be-BY", "beq-CG", "bg-BG", "bin-NG", "bkw-CG", "bm-ML", "bn-BD", "bo-CN",
    "br-FR", "brx-IN", "buc-YT", "bvx-CG", "ca-ES", "chr-US", "co-FR", "cop-EG", "cs-CZ", "csb-PL",
    "cu-RU", "cv-RU", "cy-GB", "da-DK", "dde-CG", "de-DE", "dgo-IN", "dv-MV", "ebo-CG", "ee-GH",
    "el-GR", "es-ES", "et-EE", "fa-IR", "ff-SN", "fi-FI", "fil-PH", "fj-FJ", "fkv-NO", "frp-FR",
    "fo-FO", "fon-BJ", "fur-IT", "fuv-NG", "fy-NL", "ga-IE", "gd-GB", "gl-ES", "grc-GR", "gsc-FR",
    "gsw-FR", "gu-IN", "gug-PY", "gv-GB", "gym-PA", "ha-NG", "haw-US", "he-IL", "hi-IN", "hil-PH",
    "hr-HR", "hsb-DE", "ht-HT", "hu-HU", "hy-AM", "ibb-NG", "id-ID", "ig-NG", "ii-CN", "is-IS",
    "it-IT", "iyx-CG", "ja-JP", "ka-GE", "kab-DZ", "kca-RU", "ki-KE", "kk-KZ", "kkw-CG", "kl-GL",
    "km-KH", "kn-IN", "kng-CD", "ko-KR", "koi-RU", "kok-IN", "kpv-RU", "kr-NG", "ksf-CM", "ktu-CD",
    "kum-RU", "kw-UK", "ky-KG", "lb-LU", "ldi-CG", "lg-UG", "lgr-SB", "lif-NP", "liv-RU", "lld-IT",
    "ln-CD", "lo-LA", "lt-LT", "ltg-LV", "lv-LV", "mai-IN", "mdf-RU", "mdw-CG", "mhr-RU", "mi-NZ",
    "mk-MK", "mkw-CG", "ml-IN", "mnc-CN", "mni-IN", "mo-MD", "moh-CA", "mos-BF", "mr-IN", "mrj-RU",
    "ms-MY", "mt-MT", "my-MM", "myv-RU", "nds-DE", "ne-NP", "ngz-CG", "nio-RU", "njx-CG", "njy-CM",
    "nl-NL", "nog-RU", "nqo-GN", "nr-ZA", "nso-ZA", "no-NO", "ny-MW", "oc-FR", "olo-RU", "om-ET",
    "or-IN", "pa-IN", "pap-AN", "pjt-AU", "pl-PL", "plt-MG", "prs-AF", "ps-AF", "pt-PT", "pui-CO",
    "puu-GA", "quc-CO", "quh-BO", "qul-BO", "qut-GT", "quz-EC", "rm-CH", "ro-RO", "ru-RU", "rue-UA",
    "rw-RW", "sa-IN", "sah-RU", "sat-IN", "sc-IT", "sd-IN", "sdc-IT", "sdh-IR", "sdj-CG", "sdn-IT",
    "se-NO", "seb-YT", "sg-CF", "shs-CA", "si-LK", "sid-ET", "sjd-RU", "sje-SE", "sjo-CN", "sk-SK",
    "sl-SI", "so-SO", "sq-AL", "src-IT", "sro-IT", "ss-ZA", "st-ZA", "sv-SE", "sw-KE", "syr-TR",
    "szl-PL", "ta-IN", "te-IN", "tek-CG", "tet-TL", "th-TH", "ti-ET", "tk-TM", "tl-PH", "tpi-PG",
    "tmz-MA", "tn-ZA", "tr-TR", "ts-ZA", "tsa-CG", "tt-RU", "ty-PF", "tyx-CG", "udm-RU", "ug-CN",
    "uk-UA", "ur-PK", "ve-ZA", "vec-IT", "vep-RU", "vi-VN", "vif-CG", "vro-EE", "wa-BE", "wo-SN",
    "xh-ZA", "xku-CG", "yi-IL", "yo-NG", "yom-CD", "yrk-RU", "yue-HK", "zu-ZA",
];

lazy_static! {
    /// Languages the host registers without a region.
    pub static ref REGION_FREE_TAGS: HashSet<&'static str> = [
        "ar", "bs", "ckb", "cz", "dsb", "dz", "eu", "en", "eo", "fr", "ia", "ie", "iu", "jbo",
        "ks", "la", "mn", "nb", "nn", "pnb", "qtz", "sh", "sma", "smj", "smn", "sms", "sr", "tg",
        "uz", "zh",
    ]
    .into_iter()
    .collect();
}

/// A parsed language tag.
///
/// Parsing accepts `-` and `_` as separators and canonicalizes case, so
/// `AZ_az` and `az-AZ` are the same tag.
///
/// Tags with private-use, extension or grandfathered subtags (`qaa-x-mylang`,
/// `i-klingon`) are kept verbatim as opaque tags: only the primary subtag is
/// known and the registry is never consulted for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageTag {
    primary: String,
    script: Option<String>,
    region: Option<String>,
    #[serde(rename = "tag")]
    canonical: String,
    #[serde(skip)]
    opaque: bool,
}

impl LanguageTag {
    pub fn parse(input: &str) -> Result<Self, Error> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_lang_tag(input, "tag is empty"));
        }
        match trimmed.parse::<LanguageIdentifier>() {
            Ok(lid) => Ok(Self::from_identifier(&lid)),
            Err(e) => Self::opaque(trimmed)
                .ok_or_else(|| Error::invalid_lang_tag(input, format!("{}", e))),
        }
    }

    fn from_identifier(lid: &LanguageIdentifier) -> Self {
        Self {
            primary: lid.language.as_str().to_string(),
            script: lid.script.map(|s| s.as_str().to_string()),
            region: lid.region.map(|r| r.as_str().to_string()),
            canonical: lid.to_string(),
            opaque: false,
        }
    }

    /// Subtags must be 1 to 8 ASCII alphanumerics; the tag also names
    /// archive entries.
    fn opaque(trimmed: &str) -> Option<Self> {
        let mut subtags = trimmed.split(['-', '_']);
        let primary = subtags.next()?;
        let valid = |subtag: &str| {
            (1..=8).contains(&subtag.len()) && subtag.chars().all(|c| c.is_ascii_alphanumeric())
        };
        if !valid(primary) || !subtags.all(valid) {
            return None;
        }
        Some(Self {
            primary: primary.to_ascii_lowercase(),
            script: None,
            region: None,
            canonical: trimmed.to_string(),
            opaque: true,
        })
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn has_region(&self) -> bool {
        self.region.is_some()
    }

    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// True for tags kept verbatim because the structured parser rejects them.
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }
}

impl Display for LanguageTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for LanguageTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanguageTag::parse(s)
    }
}

/// How a tag got its final form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// The tag already carried a region.
    AsGiven,
    /// A bare tag was replaced by a registry entry.
    Regionalized { from: String },
    /// The tag is registered as needing no region.
    RegionFree,
    /// Nothing in the registry vouches for the tag; it is used unchanged.
    Unverified,
}

/// A tag after registry resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTag {
    pub tag: LanguageTag,
    pub resolution: Resolution,
}

impl ResolvedTag {
    /// The warning the caller should show, if any.
    pub fn warning(&self) -> Option<Warning> {
        match &self.resolution {
            Resolution::Regionalized { from } => Some(Warning::RegionCoerced {
                from: from.clone(),
                to: self.tag.to_string(),
            }),
            Resolution::Unverified => Some(Warning::UnverifiedTag {
                tag: self.tag.to_string(),
            }),
            Resolution::AsGiven | Resolution::RegionFree => None,
        }
    }
}

/// Returns the first registry tag whose language part is `tag`.
pub fn find_regional(tag: &str) -> Option<&'static str> {
    let prefix = format!("{}-", tag);
    REGIONAL_TAGS
        .iter()
        .copied()
        .find(|candidate| candidate.starts_with(&prefix))
}

/// Resolves a possibly partial tag into the tag the package is built for.
///
/// Tags with a region are used as given. Bare tags are regionalized from
/// [`REGIONAL_TAGS`], or accepted when the language is in
/// [`REGION_FREE_TAGS`]. Anything else is accepted as [`Resolution::Unverified`],
/// unless `strict` is set, in which case it is an error.
pub fn resolve(input: &str, strict: bool) -> Result<ResolvedTag, Error> {
    let tag = LanguageTag::parse(input)?;

    if tag.is_opaque() {
        return unverified(tag, strict);
    }

    if tag.has_region() {
        return Ok(ResolvedTag {
            tag,
            resolution: Resolution::AsGiven,
        });
    }

    if let Some(regional) = find_regional(tag.as_str()) {
        tracing::debug!(from = %tag, to = regional, "regionalized language tag");
        return Ok(ResolvedTag {
            tag: LanguageTag::parse(regional)?,
            resolution: Resolution::Regionalized {
                from: tag.to_string(),
            },
        });
    }

    if REGION_FREE_TAGS.contains(tag.primary()) {
        return Ok(ResolvedTag {
            tag,
            resolution: Resolution::RegionFree,
        });
    }

    unverified(tag, strict)
}

fn unverified(tag: LanguageTag, strict: bool) -> Result<ResolvedTag, Error> {
    if strict {
        return Err(Error::invalid_lang_tag(
            tag.as_str(),
            "no region given and the tag is not in the registry",
        ));
    }
    tracing::debug!(tag = %tag, "using unverified language tag");
    Ok(ResolvedTag {
        tag,
        resolution: Resolution::Unverified,
    })
}

/// Language, script and region of a maximized tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagAnalysis {
    pub lang: String,
    pub script: String,
    pub region: String,
}

/// Expands a tag to its likely full form, e.g. `sr` to `sr-Cyrl-RS`.
///
/// Fails when the tag does not parse or when no script and region can be
/// inferred for it.
pub fn analyse(input: &str) -> Result<TagAnalysis, Error> {
    let trimmed = input.trim();
    let mut lid: LanguageIdentifier = trimmed
        .parse()
        .map_err(|e| Error::invalid_lang_tag(input, format!("{}", e)))?;
    lid.maximize();

    let script = lid
        .script
        .map(|s| s.as_str().to_string())
        .ok_or_else(|| Error::invalid_lang_tag(input, "cannot infer a script"))?;
    let region = lid
        .region
        .map(|r| r.as_str().to_string())
        .ok_or_else(|| Error::invalid_lang_tag(input, "cannot infer a region"))?;

    Ok(TagAnalysis {
        lang: lid.language.as_str().to_string(),
        script,
        region,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonicalizes() {
        let tag = LanguageTag::parse("AZ_az").unwrap();
        assert_eq!(tag.as_str(), "az-AZ");
        assert_eq!(tag.primary(), "az");
        assert_eq!(tag.region(), Some("AZ"));
        assert_eq!(tag.script(), None);
    }

    #[test]
    fn test_parse_with_script() {
        let tag = LanguageTag::parse("sr-latn").unwrap();
        assert_eq!(tag.as_str(), "sr-Latn");
        assert_eq!(tag.script(), Some("Latn"));
        assert!(!tag.has_region());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            LanguageTag::parse("not a tag!"),
            Err(Error::InvalidLangTag { .. })
        ));
        assert!(LanguageTag::parse("   ").is_err());
    }

    #[test]
    fn test_parse_keeps_private_use_tags_verbatim() {
        for input in ["qaa-x-mylang", "en-x-foo", "de-DE-u-co-phonebk", "i-klingon"] {
            let tag = LanguageTag::parse(input).unwrap();
            assert!(tag.is_opaque(), "{} should be opaque", input);
            assert_eq!(tag.as_str(), input);
        }
        let tag = LanguageTag::parse(" QAA_x_MyLang ").unwrap();
        assert_eq!(tag.primary(), "qaa");
        assert_eq!(tag.as_str(), "QAA_x_MyLang");
        assert!(!LanguageTag::parse("az-AZ").unwrap().is_opaque());
        assert!(LanguageTag::parse("qaa-x-").is_err());
        assert!(LanguageTag::parse("qaa-x-toolongsubtag").is_err());
    }

    #[test]
    fn test_private_use_tag_is_unverified() {
        let resolved = resolve("qaa-x-mylang", false).unwrap();
        assert_eq!(resolved.tag.as_str(), "qaa-x-mylang");
        assert_eq!(resolved.resolution, Resolution::Unverified);
        assert_eq!(
            resolved.warning(),
            Some(Warning::UnverifiedTag {
                tag: "qaa-x-mylang".to_string()
            })
        );

        // Extension subtags hide the region, so the registry is not consulted.
        let resolved = resolve("de-DE-u-co-phonebk", false).unwrap();
        assert_eq!(resolved.resolution, Resolution::Unverified);
    }

    #[test]
    fn test_private_use_tag_fails_in_strict_mode() {
        let err = resolve("qaa-x-mylang", true).unwrap_err();
        assert!(matches!(err, Error::InvalidLangTag { .. }));
        assert!(err.to_string().contains("qaa-x-mylang"));
    }

    #[test]
    fn test_bare_tag_is_regionalized() {
        let resolved = resolve("az", false).unwrap();
        assert_eq!(resolved.tag.as_str(), "az-AZ");
        assert_eq!(
            resolved.resolution,
            Resolution::Regionalized {
                from: "az".to_string()
            }
        );
        assert_eq!(
            resolved.warning(),
            Some(Warning::RegionCoerced {
                from: "az".to_string(),
                to: "az-AZ".to_string()
            })
        );
    }

    #[test]
    fn test_regional_tag_is_used_as_given() {
        let resolved = resolve("az-AZ", false).unwrap();
        assert_eq!(resolved.tag.as_str(), "az-AZ");
        assert_eq!(resolved.resolution, Resolution::AsGiven);
        assert_eq!(resolved.warning(), None);

        // A region outside the registry is still taken verbatim.
        let resolved = resolve("de-CH", false).unwrap();
        assert_eq!(resolved.tag.as_str(), "de-CH");
        assert_eq!(resolved.resolution, Resolution::AsGiven);
    }

    #[test]
    fn test_registry_order_wins() {
        // "kw" matches only kw-UK; the first match is taken.
        assert_eq!(find_regional("kw"), Some("kw-UK"));
        // Three-letter language codes must not match two-letter prefixes.
        assert_eq!(find_regional("sd"), Some("sd-IN"));
        assert_eq!(find_regional("sdc"), Some("sdc-IT"));
    }

    #[test]
    fn test_region_free_tag() {
        let resolved = resolve("fr", false).unwrap();
        assert_eq!(resolved.tag.as_str(), "fr");
        assert_eq!(resolved.resolution, Resolution::RegionFree);
        assert_eq!(resolved.warning(), None);

        let resolved = resolve("sr-Latn", false).unwrap();
        assert_eq!(resolved.resolution, Resolution::RegionFree);
    }

    #[test]
    fn test_unknown_tag_is_lenient_but_observable() {
        let resolved = resolve("xyz", false).unwrap();
        assert_eq!(resolved.tag.as_str(), "xyz");
        assert_eq!(resolved.resolution, Resolution::Unverified);
        assert_eq!(
            resolved.warning(),
            Some(Warning::UnverifiedTag {
                tag: "xyz".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_tag_fails_in_strict_mode() {
        let err = resolve("xyz", true).unwrap_err();
        assert!(err.to_string().contains("xyz"));
        // Strict mode does not affect known tags.
        assert!(resolve("az", true).is_ok());
    }

    #[test]
    fn test_registry_entries_parse_and_have_regions() {
        for entry in REGIONAL_TAGS {
            let tag = LanguageTag::parse(entry).unwrap();
            assert!(tag.has_region(), "{} has no region", entry);
            assert_eq!(&tag.as_str(), entry);
        }
    }

    #[test]
    fn test_analyse_maximizes() {
        let analysis = analyse("sr").unwrap();
        assert_eq!(analysis.lang, "sr");
        assert_eq!(analysis.script, "Cyrl");
        assert_eq!(analysis.region, "RS");

        let analysis = analyse("en").unwrap();
        assert_eq!(analysis.script, "Latn");
        assert_eq!(analysis.region, "US");
    }

    #[test]
    fn test_analyse_keeps_explicit_subtags() {
        let analysis = analyse("sr-Latn").unwrap();
        assert_eq!(analysis.script, "Latn");
        assert_eq!(analysis.region, "RS");
    }

    #[test]
    fn test_analyse_fails_for_unknown_language() {
        assert!(matches!(
            analyse("qqq"),
            Err(Error::InvalidLangTag { .. })
        ));
        assert!(analyse("!!").is_err());
    }
}
