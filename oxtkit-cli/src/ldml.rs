//! `oxtkit ldml`: render an LDML file through a document template.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Args;

use oxtkit::{LdmlOptions, generate_ldml_document};

use crate::validation::{validate_file_path, validate_output_path};

#[derive(Args, Debug, Clone, Default)]
pub struct LdmlArgs {
    /// LDML file to process
    pub infile: PathBuf,

    /// Output file to generate
    pub outfile: PathBuf,

    /// Template file to generate from [default: bundled simple_ldml.fodt]
    #[arg(short, long)]
    pub template: Option<PathBuf>,

    /// Language tag for this data; inferred from the input file name if omitted
    #[arg(short, long)]
    pub langtag: Option<String>,
}

impl LdmlArgs {
    pub fn options(&self) -> LdmlOptions {
        LdmlOptions::new(&self.infile)
            .with_template(self.template.clone())
            .with_langtag(self.langtag.clone())
    }
}

/// Execute the ldml subcommand.
pub fn run_ldml(args: &LdmlArgs) -> Result<u8> {
    validate_file_path(&args.infile).map_err(|e| anyhow!(e))?;
    if let Some(template) = &args.template {
        validate_file_path(template).map_err(|e| anyhow!(e))?;
    }
    validate_output_path(&args.outfile).map_err(|e| anyhow!(e))?;

    generate_ldml_document(&args.options(), &args.outfile)
        .with_context(|| format!("failed to render {}", args.infile.display()))?;
    Ok(0)
}
