
use anyhow::ensure;
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_optional_filename, AFTER_HELP, FULL_VERSION};
use crate::rules::duplicate_detector::DEFAULT_BLOOM_SIZE_MB;
use crate::rules::sort_order::ChromOrder;
use crate::validation_session::{ValidatorConfig, ValidatorConfigBuilder};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct ValidateSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    anteater_version: String,

    /// Input variant call file (VCF, optionally gzip/BGZF) [default: stdin]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_filename: Option<PathBuf>,

    /// Reference FASTA file, enables the CHROM and REF checks
    #[clap(short = 'r')]
    #[clap(long = "reference")]
    #[clap(value_name = "FASTA")]
    #[clap(help_heading = Some("Input/Output"))]
    pub reference_fn: Option<PathBuf>,

    /// dbSNP VCF file, enables the ID check
    #[clap(long = "dbsnp")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    pub dbsnp_fn: Option<PathBuf>,

    /// Output table of every finding (CSV/TSV)
    #[clap(long = "findings")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub findings_filename: Option<PathBuf>,

    /// Output summary of the run (JSON, gzipped if it ends in .gz)
    #[clap(long = "summary-json")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub summary_filename: Option<PathBuf>,

    /// Disables echoing the input to stdout
    #[clap(long = "no-passthrough")]
    #[clap(help_heading = Some("Input/Output"))]
    pub no_passthrough: bool,

    /// Treats every warning as an error and requires exact column counts
    #[clap(short = 's')]
    #[clap(long = "strict")]
    #[clap(help_heading = Some("Validation"))]
    pub strict: bool,

    /// Disables the INFO AN/AC consistency checks
    #[clap(long = "no-an-ac-check")]
    #[clap(help_heading = Some("Validation"))]
    pub skip_an_ac_check: bool,

    /// Treats a file without any records as valid
    #[clap(long = "allow-empty")]
    #[clap(help_heading = Some("Validation"))]
    pub allow_empty: bool,

    /// Expected ordering of the records
    #[clap(long = "chrom-order")]
    #[clap(value_name = "ORDER")]
    #[clap(help_heading = Some("Sort order"))]
    #[clap(default_value = "lexicographic")]
    pub chrom_order: ChromOrder,

    /// Shorthand for --chrom-order natural (chr2 sorts before chr10)
    #[clap(long = "natural-chr")]
    #[clap(help_heading = Some("Sort order"))]
    pub natural_chr: bool,

    /// Disables the sort order check
    #[clap(long = "no-sort-check")]
    #[clap(help_heading = Some("Sort order"))]
    pub skip_sort_check: bool,

    /// Reports records that possibly repeat an earlier variant
    #[clap(short = 'd')]
    #[clap(long = "report-dups")]
    #[clap(help_heading = Some("Duplicates"))]
    pub report_duplicates: bool,

    /// Never builds the duplicate detector, even with --report-dups
    #[clap(long = "no-dup-check")]
    #[clap(help_heading = Some("Duplicates"))]
    pub skip_duplicate_check: bool,

    /// Memory budget for the duplicate detector (MB)
    #[clap(long = "bloom-size-mb")]
    #[clap(value_name = "MB")]
    #[clap(help_heading = Some("Duplicates"))]
    #[clap(default_value_t = DEFAULT_BLOOM_SIZE_MB)]
    pub bloom_size_mb: usize,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8
}

impl ValidateSettings {
    /// Builds the validator configuration from already checked settings
    pub fn validator_config(&self) -> anyhow::Result<ValidatorConfig> {
        let config = ValidatorConfigBuilder::default()
            .strict(self.strict)
            .report_duplicates(self.report_duplicates)
            .skip_duplicate_check(self.skip_duplicate_check)
            .bloom_size_mb(self.bloom_size_mb)
            .chrom_order(self.chrom_order)
            .skip_sort_check(self.skip_sort_check)
            .skip_an_ac_check(self.skip_an_ac_check)
            .allow_empty(self.allow_empty)
            .build()?;
        Ok(config)
    }
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled { "ENABLED" } else { "DISABLED" }
}

pub fn check_validate_settings(mut settings: ValidateSettings) -> anyhow::Result<ValidateSettings> {
    // hard code the version in
    settings.anteater_version = FULL_VERSION.clone();
    info!("Anteater version: {:?}", &settings.anteater_version);
    info!("Sub-command: validate");
    info!("Inputs:");

    // check for all the input files
    check_optional_filename(settings.input_filename.as_deref(), "Input VCF")?;
    match settings.input_filename.as_deref() {
        Some(input_fn) => info!("\tInput VCF: {input_fn:?}"),
        None => info!("\tInput VCF: stdin")
    };
    check_optional_filename(settings.reference_fn.as_deref(), "Reference FASTA")?;
    info!("\tReference: {:?}", &settings.reference_fn);
    check_optional_filename(settings.dbsnp_fn.as_deref(), "dbSNP VCF")?;
    info!("\tdbSNP: {:?}", &settings.dbsnp_fn);

    // outputs
    info!("Outputs:");
    info!("\tPass-through: {}", enabled_label(!settings.no_passthrough));
    info!("\tFindings table: {:?}", &settings.findings_filename);
    info!("\tSummary JSON: {:?}", &settings.summary_filename);

    info!("Validation parameters:");
    info!("\tStrict mode: {}", enabled_label(settings.strict));
    info!("\tAN/AC check: {}", enabled_label(!settings.skip_an_ac_check));
    info!("\tAllow empty: {}", enabled_label(settings.allow_empty));

    info!("Sort order parameters:");
    if settings.natural_chr {
        settings.chrom_order = ChromOrder::Natural;
    }
    info!("\tSort check: {}", enabled_label(!settings.skip_sort_check));
    info!("\tChromosome order: {}", settings.chrom_order);

    info!("Duplicate parameters:");
    ensure!(settings.bloom_size_mb > 0, "--bloom-size-mb must be >0");
    if settings.report_duplicates && settings.skip_duplicate_check {
        info!("\tDuplicate check: DISABLED (--no-dup-check overrides --report-dups)");
    } else {
        info!("\tDuplicate check: {}", enabled_label(settings.report_duplicates));
    }
    info!("\tBloom filter size: {} MB", settings.bloom_size_mb);

    Ok(settings)
}
