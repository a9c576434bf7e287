//! `oxtkit package`: build an `.oxt` dictionary extension.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Args;

use oxtkit::{
    DictType, FontBinding, PackageOptions, PackageReport, ScriptType, TimestampPolicy,
    build_package,
};

use crate::{
    config::Config,
    validation::{
        validate_dict_type, validate_file_path, validate_font_assignment, validate_language_tag,
        validate_output_path,
    },
};

/// Environment variable holding a reproducible-build timestamp.
pub const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

#[derive(Args, Debug, Clone, Default)]
#[command(disable_version_flag = true)]
pub struct PackageArgs {
    /// Language tag for this extension, e.g. az or az-AZ
    pub langtag: String,

    /// Output .oxt file
    pub outfile: PathBuf,

    /// ASCII punctuation characters that are word forming
    #[arg(short, long)]
    pub word: Option<String>,

    /// Script type [west, asian, ctl, rtl, none]. Use none if LibreOffice already knows the tag
    #[arg(short = 't', long = "type")]
    pub script_type: Option<String>,

    /// Font for a semantic font role, e.g. -f UI_SANS="Times New Roman". May be repeated
    #[arg(short, long = "font")]
    pub fonts: Vec<String>,

    /// Language name for UI strings
    #[arg(short, long)]
    pub langname: Option<String>,

    /// Word list dictionary. For hunspell dictionaries give the .aff file
    #[arg(short, long)]
    pub dict: Option<PathBuf>,

    /// Merge the given affix file data into the generated .aff file
    #[arg(short, long)]
    pub affix: Option<PathBuf>,

    /// Extension version number [default: 0.1]
    #[arg(short = 'v', long = "version", id = "pkg_version")]
    pub version: Option<String>,

    /// Dictionary type [hunspell, pt, ptall, text]; inferred from the extension if omitted
    #[arg(long)]
    pub dicttype: Option<String>,

    /// Name of publisher
    #[arg(long)]
    pub publisher: Option<String>,

    /// URL of publisher
    #[arg(long)]
    pub puburl: Option<String>,

    /// Fail instead of warning when the tag is not in the tag registry
    #[arg(long)]
    pub strict_langtag: bool,

    /// Entry timestamp: build, legacy, or a date-time such as 2024-01-01T00:00:00Z
    #[arg(long)]
    pub timestamp: Option<String>,

    /// Directory with replacement dictxcu.xml and oxtdescription.xml templates
    #[arg(long)]
    pub resdir: Option<PathBuf>,

    /// Print the build report as JSON instead of plain warnings
    #[arg(long)]
    pub json: bool,
}

/// Picks the timestamp policy: `--timestamp`, then `SOURCE_DATE_EPOCH`, then
/// the config file, then build time.
pub fn timestamp_policy(
    flag: Option<&str>,
    source_date_epoch: Option<&str>,
    config: Option<&str>,
) -> Result<TimestampPolicy> {
    if let Some(value) = flag {
        return value
            .parse()
            .with_context(|| format!("invalid --timestamp `{}`", value));
    }
    if let Some(epoch) = source_date_epoch {
        let seconds: i64 = epoch
            .trim()
            .parse()
            .with_context(|| format!("{} must be whole seconds, got `{}`", SOURCE_DATE_EPOCH, epoch))?;
        return Ok(TimestampPolicy::from_epoch(seconds)?);
    }
    if let Some(value) = config {
        return value
            .parse()
            .with_context(|| format!("invalid timestamp `{}` in config", value));
    }
    Ok(TimestampPolicy::BuildTime)
}

/// Merges flags over config values into library options.
pub fn package_options(
    args: &PackageArgs,
    config: &Config,
    source_date_epoch: Option<&str>,
) -> Result<PackageOptions> {
    let mut fonts: FontBinding = config
        .fonts
        .iter()
        .map(|(role, family)| (role.clone(), family.clone()))
        .collect();
    for assignment in &args.fonts {
        let (role, family) = FontBinding::parse_assignment(assignment)?;
        fonts.insert(role, family);
    }

    let script_type = args
        .script_type
        .as_deref()
        .or(config.script_type.as_deref())
        .map(ScriptType::from_name)
        .unwrap_or_default();

    let dict_type = args
        .dicttype
        .as_deref()
        .map(str::parse::<DictType>)
        .transpose()?;

    let timestamp = timestamp_policy(
        args.timestamp.as_deref(),
        source_date_epoch,
        config.timestamp.as_deref(),
    )?;

    let mut options = PackageOptions::new(args.langtag.clone())
        .with_strict_langtag(args.strict_langtag || config.strict_langtag.unwrap_or(false))
        .with_script_type(script_type)
        .with_language(args.langname.clone())
        .with_publisher(
            args.publisher.clone().or_else(|| config.publisher.clone()),
            args.puburl
                .clone()
                .or_else(|| config.puburl.clone())
                .unwrap_or_default(),
        )
        .with_fonts(fonts)
        .with_word_chars(args.word.clone().or_else(|| config.word.clone()).unwrap_or_default())
        .with_dictionary(args.dict.clone(), dict_type)
        .with_affix(args.affix.clone())
        .with_timestamp(timestamp)
        .with_resource_dir(args.resdir.clone().or_else(|| config.resdir.clone()));
    if let Some(version) = args.version.clone().or_else(|| config.version.clone()) {
        options = options.with_version(version);
    }
    Ok(options)
}

/// Lines printed for a finished build.
pub fn report_output(report: &PackageReport, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    Ok(report
        .warnings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Execute the package subcommand.
pub fn run_package(args: &PackageArgs, config: &Config) -> Result<u8> {
    validate_language_tag(&args.langtag).map_err(|e| anyhow!(e))?;
    for input in [&args.dict, &args.affix].into_iter().flatten() {
        validate_file_path(input).map_err(|e| anyhow!(e))?;
    }
    for assignment in &args.fonts {
        validate_font_assignment(assignment).map_err(|e| anyhow!(e))?;
    }
    if let Some(dicttype) = &args.dicttype {
        validate_dict_type(dicttype).map_err(|e| anyhow!(e))?;
    }
    validate_output_path(&args.outfile).map_err(|e| anyhow!(e))?;

    let epoch = std::env::var(SOURCE_DATE_EPOCH).ok();
    let options = package_options(args, config, epoch.as_deref())?;
    tracing::debug!(?options, "package options");

    let report = build_package(&options, &args.outfile)
        .with_context(|| format!("failed to build {}", args.outfile.display()))?;

    let output = report_output(&report, args.json)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(0)
}
