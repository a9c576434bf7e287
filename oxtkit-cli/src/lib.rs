//! CLI library for testing purposes

pub mod config;
pub mod ldml;
pub mod package;
pub mod validation;

pub use config::Config;
pub use ldml::{LdmlArgs, run_ldml};
pub use package::{PackageArgs, package_options, report_output, run_package};
