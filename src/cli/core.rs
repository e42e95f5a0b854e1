
use anyhow::bail;
use clap::{Parser, Subcommand};
use chrono::Datelike;
use lazy_static::lazy_static;
use std::path::Path;

use crate::cli::validate::ValidateSettings;

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.11.0-6bb9635-dirty` - while on a dirty branch
    /// * `0.11.0-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));

    /// Shared after help string containing the legalese.
    pub static ref AFTER_HELP: String = format!("Copyright (C) 2024-{}     The Anteater developers.
This program comes with ABSOLUTELY NO WARRANTY; findings are advisory
and a valid result does not guarantee downstream tools will accept the file.", chrono::Utc::now().year());
}

#[derive(Parser)]
#[clap(author, 
    version = &**FULL_VERSION, 
    about, 
    after_help = &**AFTER_HELP)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

/// Anteater, a tool for sniffing out malformed records in VCF files.
/// Select a subcommand to see more usage information:
#[derive(Subcommand)]
pub enum Commands {
    /// Checks a VCF stream line by line and reports every problem found
    Validate(Box<ValidateSettings>)
}

/// Parses the process arguments
pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if an optional file exists, erroring out if it was given and is missing
/// # Arguments
/// * `opt_filename` - the file path to check for, if any
/// * `label` - the label to use for error messages
pub fn check_optional_filename(opt_filename: Option<&Path>, label: &str) -> anyhow::Result<()> {
    if let Some(filename) = opt_filename {
        if !filename.exists() {
            bail!("{} does not exist: \"{}\"", label, filename.display());
        }
    }

    // file either was not specified OR it exists
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::sort_order::ChromOrder;

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from([
            "anteater", "validate", "--strict", "-d", "--bloom-size-mb", "4",
            "--chrom-order", "natural", "--no-passthrough", "-vv", "input.vcf.gz"
        ]).unwrap();
        let Commands::Validate(settings) = cli.command;
        assert_eq!(settings.input_filename.as_deref(), Some(Path::new("input.vcf.gz")));
        assert!(settings.strict);
        assert!(settings.report_duplicates);
        assert!(settings.no_passthrough);
        assert_eq!(settings.bloom_size_mb, 4);
        assert_eq!(settings.chrom_order, ChromOrder::Natural);
        assert_eq!(settings.verbosity, 2);
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["anteater", "validate"]).unwrap();
        let Commands::Validate(settings) = cli.command;
        assert!(settings.input_filename.is_none());
        assert_eq!(settings.bloom_size_mb, 128);
        assert_eq!(settings.chrom_order, ChromOrder::Lexicographic);
        assert!(Cli::try_parse_from(["anteater", "validate", "--chrom-order", "random"]).is_err());
    }

    #[test]
    fn test_optional_filename() {
        assert!(check_optional_filename(None, "Reference FASTA").is_ok());
        assert!(check_optional_filename(Some(Path::new(env!("CARGO_MANIFEST_DIR"))), "Folder").is_ok());
        assert!(check_optional_filename(Some(Path::new("/missing/ref.fa")), "Reference FASTA").is_err());
    }
}
