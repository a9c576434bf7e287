use std::{io, path::PathBuf, process::ExitCode};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

use oxtkit_cli::{Config, LdmlArgs, PackageArgs, run_ldml, run_package};

/// Build LibreOffice dictionary extensions and LDML documents.
#[derive(Parser, Debug)]
#[command(name = "oxtkit", author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging on stderr. Repeat for more (--verbose --verbose).
    #[arg(long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML file with defaults for package builds.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build an .oxt extension with a spelling dictionary and language registration.
    Package(PackageArgs),

    /// Render an LDML locale file through a document template.
    Ldml(LdmlArgs),

    /// Print a shell completion script.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Package(args) => {
            Config::load_optional(cli.config.as_deref()).and_then(|config| run_package(args, &config))
        }
        Commands::Ldml(args) => run_ldml(args),
        Commands::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "oxtkit", &mut io::stdout());
            Ok(0)
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_package() {
        let cli = Cli::try_parse_from([
            "oxtkit",
            "--verbose",
            "package",
            "az",
            "az.oxt",
            "-v",
            "1.0",
            "-f",
            "UI_SANS=Noto Sans",
            "-f",
            "UI_SERIF=Noto Serif",
            "-t",
            "ctl",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        let Commands::Package(args) = cli.command else {
            panic!("expected package");
        };
        assert_eq!(args.langtag, "az");
        assert_eq!(args.version.as_deref(), Some("1.0"));
        assert_eq!(args.fonts.len(), 2);
        assert_eq!(args.script_type.as_deref(), Some("ctl"));
    }

    #[test]
    fn test_parse_ldml() {
        let cli = Cli::try_parse_from(["oxtkit", "ldml", "in.xml", "out.fodt", "-l", "sr"]).unwrap();
        let Commands::Ldml(args) = cli.command else {
            panic!("expected ldml");
        };
        assert_eq!(args.langtag.as_deref(), Some("sr"));
        assert_eq!(args.template, None);
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["oxtkit", "package", "az", "az.oxt", "--config", "c.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }
}
