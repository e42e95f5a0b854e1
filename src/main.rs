
use log::{LevelFilter, error, info};
use std::io::BufWriter;
use std::time::Instant;

use anteater::cli::core::{Commands, get_cli};
use anteater::cli::validate::{ValidateSettings, check_validate_settings};
use anteater::parsing::dbsnp_lookup::KnownIds;
use anteater::parsing::input::open_vcf_input;
use anteater::parsing::reference_lookup::ReferenceSequences;
use anteater::rules::strictness::StrictnessPolicy;
use anteater::util::json_io::save_json;
use anteater::validation_session::ValidationSession;
use anteater::writers::findings_table::FindingsTableWriter;
use anteater::writers::report_aggregator::ReportAggregator;

fn run_validate(settings: ValidateSettings) -> i32 {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    let settings = match check_validate_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let config = match settings.validator_config() {
        Ok(c) => c,
        Err(e) => {
            error!("Error while building validator config: {e:#}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    let mut session = match ValidationSession::new(config) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while building validation session: {e}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    // load the optional collaborators
    if let Some(reference_fn) = settings.reference_fn.as_deref() {
        info!("Pre-loading reference genome into memory...");
        let reference = match ReferenceSequences::from_fasta(reference_fn) {
            Ok(r) => r,
            Err(e) => {
                error!("Error while loading reference genome: {e:#}");
                std::process::exit(exitcode::IOERR);
            }
        };
        session = session.with_reference(Box::new(reference));
    }

    if let Some(dbsnp_fn) = settings.dbsnp_fn.as_deref() {
        info!("Pre-loading dbSNP identifiers into memory...");
        let known_ids = match KnownIds::from_vcf(dbsnp_fn) {
            Ok(k) => k,
            Err(e) => {
                error!("Error while loading dbSNP identifiers: {e:#}");
                std::process::exit(exitcode::IOERR);
            }
        };
        info!("Loaded {} dbSNP identifiers.", known_ids.len());
        session = session.with_known_ids(Box::new(known_ids));
    }

    // open the input and all the outputs
    let reader = match open_vcf_input(settings.input_filename.as_deref()) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while opening input VCF: {e:#}");
            std::process::exit(exitcode::NOINPUT);
        }
    };

    let diagnostics = BufWriter::new(std::io::stderr());
    let mut aggregator = ReportAggregator::new(diagnostics, StrictnessPolicy::new(settings.strict));
    if let Some(findings_fn) = settings.findings_filename.as_deref() {
        info!("Opening findings table at {findings_fn:?}...");
        match FindingsTableWriter::new(findings_fn) {
            Ok(table) => {
                aggregator = aggregator.with_findings_table(table);
            },
            Err(e) => {
                error!("Error while creating findings table: {e}");
                std::process::exit(exitcode::IOERR);
            }
        };
    }

    let passthrough = if settings.no_passthrough {
        None
    } else {
        Some(BufWriter::new(std::io::stdout().lock()))
    };

    info!("Validating records...");
    let result = match session.run(reader, passthrough, &mut aggregator) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while validating input: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };
    info!("Scanned {} records: {} errors, {} warnings, {} possible duplicates.",
        result.record_lines, result.errors, result.warnings, result.possible_duplicates);

    if let Some(summary_fn) = settings.summary_filename.as_deref() {
        info!("Saving summary to {summary_fn:?}...");
        if let Err(e) = save_json(&result, summary_fn) {
            error!("Error while saving summary file: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    info!("Validation completed in {} seconds.", start_time.elapsed().as_secs_f64());
    result.exit_code()
}

fn main() {
    let cli = get_cli();
    let exit_code = match cli.command {
        Commands::Validate(settings) => {
            run_validate(*settings)
        }
    };

    info!("Process finished with exit code {exit_code}.");
    std::process::exit(exit_code);
}
