/*!
# Validation session
Owns all of the per-file state of a validation run (header schema, sort state, duplicate filter) and drives the single pass over the input.
Lines are processed strictly in order; each line produces zero or more findings that are handed to the report aggregator as soon as the line is done.
*/

use anyhow::Context;
use derive_builder::Builder;
use log::{debug, info};
use serde::Serialize;
use std::io::{BufRead, Write};

use crate::data_types::aggregate_result::AggregateResult;
use crate::data_types::finding::{Finding, Severity};
use crate::data_types::header_schema::HeaderSchema;
use crate::data_types::variant_key::VariantKey;
use crate::parsing::dbsnp_lookup::IdLookup;
use crate::parsing::header_builder::HeaderSchemaBuilder;
use crate::parsing::input::RawLineReader;
use crate::parsing::line_classifier::{classify_line, strip_line_ending, LineClass};
use crate::parsing::reference_lookup::ReferenceLookup;
use crate::rules::allele_consistency::check_allele_consistency;
use crate::rules::duplicate_detector::{DuplicateDetector, DuplicateDetectorError, DEFAULT_BLOOM_SIZE_MB};
use crate::rules::field_rules::FieldRules;
use crate::rules::sort_order::{ChromOrder, SortOrderChecker};
use crate::rules::strictness::StrictnessPolicy;
use crate::writers::report_aggregator::ReportAggregator;

/// Structural problems that stop the scan
#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("no #CHROM line found in file")]
    MissingChromHeader,
    #[error("data line encountered before #CHROM at line {line_number}")]
    DataBeforeHeader { line_number: usize },
    #[error("#CHROM line at {line_number} has {columns} columns, fewer than the 8 required")]
    MalformedChromHeader { line_number: usize, columns: usize },
    #[error("failed to read input stream: {0}")]
    Io(#[from] std::io::Error)
}

/// The options a validation run is configured with
#[derive(Builder, Clone, Copy, Debug, Serialize)]
#[builder(default)]
pub struct ValidatorConfig {
    /// if true, every warning counts as an error and column/sub-field counts must match exactly
    strict: bool,
    /// if true, possible duplicate records are reported
    report_duplicates: bool,
    /// if true, the duplicate detector is never built, even when reporting is requested
    skip_duplicate_check: bool,
    /// memory budget for the duplicate detector in MB
    bloom_size_mb: usize,
    /// the order records are expected to be sorted in
    chrom_order: ChromOrder,
    /// if true, sort order is not checked
    skip_sort_check: bool,
    /// if true, INFO AN/AC are not cross-checked
    skip_an_ac_check: bool,
    /// if true, a file without any data lines is valid
    allow_empty: bool
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            strict: false,
            report_duplicates: false,
            skip_duplicate_check: false,
            bloom_size_mb: DEFAULT_BLOOM_SIZE_MB,
            chrom_order: ChromOrder::default(),
            skip_sort_check: false,
            skip_an_ac_check: false,
            allow_empty: false
        }
    }
}

impl ValidatorConfig {
    /// True if the duplicate detector should be built
    pub fn duplicate_check_enabled(&self) -> bool {
        self.report_duplicates && !self.skip_duplicate_check
    }

    // getters
    pub fn strict(&self) -> bool {
        self.strict
    }

    pub fn report_duplicates(&self) -> bool {
        self.report_duplicates
    }

    pub fn skip_duplicate_check(&self) -> bool {
        self.skip_duplicate_check
    }

    pub fn bloom_size_mb(&self) -> usize {
        self.bloom_size_mb
    }

    pub fn chrom_order(&self) -> ChromOrder {
        self.chrom_order
    }

    pub fn skip_sort_check(&self) -> bool {
        self.skip_sort_check
    }

    pub fn skip_an_ac_check(&self) -> bool {
        self.skip_an_ac_check
    }

    pub fn allow_empty(&self) -> bool {
        self.allow_empty
    }
}

/// What a single line produced
#[derive(Debug, Default)]
pub struct LineOutcome {
    /// Findings in the order the rules produced them
    pub findings: Vec<Finding>,
    /// Set if the duplicate detector has possibly seen this record before
    pub duplicate: Option<VariantKey>,
    /// True for data lines
    pub is_record: bool
}

impl LineOutcome {
    fn from_finding(finding: Finding) -> Self {
        Self {
            findings: vec![finding],
            ..Default::default()
        }
    }
}

/// All state for validating one file
pub struct ValidationSession {
    /// Active configuration
    config: ValidatorConfig,
    /// Strictness derived from the configuration
    policy: StrictnessPolicy,
    /// Collects declarations until the #CHROM line
    schema_builder: HeaderSchemaBuilder,
    /// Set once the #CHROM line has been seen
    schema: Option<HeaderSchema>,
    /// None when sort checking is disabled
    sort_checker: Option<SortOrderChecker>,
    /// None when duplicate reporting is disabled
    duplicate_detector: Option<DuplicateDetector>,
    /// Optional REF lookup
    reference: Option<Box<dyn ReferenceLookup>>,
    /// Optional ID lookup
    known_ids: Option<Box<dyn IdLookup>>
}

impl ValidationSession {
    /// Creates a session for one file.
    /// # Arguments
    /// * `config` - the run configuration
    /// # Errors
    /// * if the duplicate detector is enabled and its memory budget is invalid
    pub fn new(config: ValidatorConfig) -> Result<Self, DuplicateDetectorError> {
        let duplicate_detector = if config.duplicate_check_enabled() {
            Some(DuplicateDetector::new(config.bloom_size_mb())?)
        } else {
            None
        };
        let sort_checker = if config.skip_sort_check() {
            None
        } else {
            Some(SortOrderChecker::new(config.chrom_order()))
        };
        debug!("Session config: {config:?}");

        Ok(Self {
            config,
            policy: StrictnessPolicy::new(config.strict()),
            schema_builder: HeaderSchemaBuilder::default(),
            schema: None,
            sort_checker,
            duplicate_detector,
            reference: None,
            known_ids: None
        })
    }

    /// Adds a reference genome used to verify REF alleles
    pub fn with_reference(mut self, reference: Box<dyn ReferenceLookup>) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Adds a set of known IDs used to verify the ID column
    pub fn with_known_ids(mut self, known_ids: Box<dyn IdLookup>) -> Self {
        self.known_ids = Some(known_ids);
        self
    }

    /// Processes one raw line (terminator included).
    /// # Arguments
    /// * `line_number` - 1-based line number
    /// * `raw` - the raw bytes of the line
    /// # Errors
    /// * if the line is a fatal structural problem (data before #CHROM, unusable #CHROM line)
    pub fn process_line(&mut self, line_number: usize, raw: &[u8]) -> Result<LineOutcome, ValidationError> {
        let raw = strip_line_ending(raw);
        let (line, is_utf8) = match std::str::from_utf8(raw) {
            Ok(l) => (std::borrow::Cow::Borrowed(l), true),
            Err(_) => (String::from_utf8_lossy(raw), false)
        };

        let line_class = classify_line(&line);
        if line_class == LineClass::Data && self.schema.is_none() {
            return Err(ValidationError::DataBeforeHeader { line_number });
        }
        if !is_utf8 {
            let mut outcome = LineOutcome::from_finding(Finding::error(line_number, "line is not valid UTF-8".to_string()));
            outcome.is_record = line_class == LineClass::Data;
            return Ok(outcome);
        }

        match line_class {
            LineClass::Blank => Ok(LineOutcome::default()),
            LineClass::Meta => {
                if self.schema.is_some() {
                    Ok(LineOutcome::from_finding(Finding::error(line_number, "meta-information line after #CHROM header".to_string())))
                } else {
                    Ok(LineOutcome {
                        findings: self.schema_builder.add_meta_line(line_number, &line),
                        ..Default::default()
                    })
                }
            },
            LineClass::ChromHeader => {
                if self.schema.is_some() {
                    return Ok(LineOutcome::from_finding(Finding::error(line_number, "duplicate #CHROM header line".to_string())));
                }
                let builder = std::mem::take(&mut self.schema_builder);
                let (schema, findings) = builder.build(line_number, &line)?;
                info!("Header schema: {} INFO keys, {} FORMAT keys, {} samples",
                    schema.info().len(), schema.format().len(), schema.sample_count());
                self.schema = Some(schema);
                Ok(LineOutcome {
                    findings,
                    ..Default::default()
                })
            },
            LineClass::UnknownHeader => {
                Ok(LineOutcome::from_finding(Finding::error(line_number, "unrecognized header line".to_string())))
            },
            LineClass::Data => Ok(self.process_record(line_number, &line))
        }
    }

    /// Runs the record rules plus the cross-line checks on a data line
    fn process_record(&mut self, line_number: usize, line: &str) -> LineOutcome {
        let mut outcome = LineOutcome {
            is_record: true,
            ..Default::default()
        };
        let Some(schema) = self.schema.as_ref() else {
            return outcome;
        };

        let rules = FieldRules::new(schema, self.policy, self.reference.as_deref(), self.known_ids.as_deref());
        let mut report = rules.check_line(line_number, line);
        outcome.findings = std::mem::take(&mut report.findings);
        let Some(fields) = report.fields.as_ref() else {
            // too few columns, nothing else to check
            return outcome;
        };

        if !self.config.skip_an_ac_check() {
            outcome.findings.extend(check_allele_consistency(line_number, fields, report.tally.as_ref()));
        }

        if let Some((chrom, pos)) = report.sort_key() {
            if let Some(checker) = self.sort_checker.as_mut() {
                if let Some((previous_chrom, previous_pos)) = checker.observe_violation(chrom, pos) {
                    outcome.findings.push(Finding::warning(line_number,
                        format!("unsorted input: {chrom}:{pos} comes after {previous_chrom}:{previous_pos}")
                    ));
                }
            }

            if let Some(detector) = self.duplicate_detector.as_mut() {
                let key = VariantKey::new(chrom, pos, fields.reference(), &fields.alt_alleles());
                if detector.check_and_insert(&key) {
                    outcome.duplicate = Some(key);
                }
            }
        }
        outcome
    }

    /// End-of-stream checks.
    /// # Arguments
    /// * `record_lines` - number of data lines seen
    /// # Errors
    /// * if the #CHROM line never appeared
    pub fn finish(&self, record_lines: u64) -> Result<Vec<Finding>, ValidationError> {
        if self.schema.is_none() {
            return Err(ValidationError::MissingChromHeader);
        }
        if let Some(detector) = self.duplicate_detector.as_ref() {
            debug!("Duplicate detector saw {} records, expected false positive rate {:.2e}",
                detector.inserted(), detector.expected_false_positive_rate(detector.inserted()));
        }
        if record_lines == 0 && !self.config.allow_empty() {
            Ok(vec![Finding::file_level(Severity::Error, "no variant records found".to_string())])
        } else {
            Ok(vec![])
        }
    }

    /// Validates a whole stream in one pass.
    /// Every raw line is echoed to `passthrough` (if provided) before it is checked, so the output is an exact copy of what was read.
    /// A fatal structural error stops the scan; it is reported and the run is finished normally.
    /// # Arguments
    /// * `reader` - the (already decompressed) input
    /// * `passthrough` - optional copy of the input bytes
    /// * `aggregator` - receives all findings and the summary
    /// # Errors
    /// * if the pass-through output, diagnostics, or findings table cannot be written
    pub fn run<R: BufRead, P: Write, W: Write>(
        &mut self, reader: R, mut passthrough: Option<P>, aggregator: &mut ReportAggregator<W>
    ) -> anyhow::Result<AggregateResult> {
        let mut line_reader = RawLineReader::new(reader);
        let mut fatal: Option<ValidationError> = None;
        loop {
            let (line_number, raw) = match line_reader.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    fatal = Some(ValidationError::Io(e));
                    break;
                }
            };

            if let Some(output) = passthrough.as_mut() {
                output.write_all(raw)
                    .context("Error while writing pass-through output:")?;
            }
            aggregator.count_line();

            match self.process_line(line_number, raw) {
                Ok(outcome) => {
                    if outcome.is_record {
                        aggregator.count_record();
                    }
                    aggregator.report_all(&outcome.findings)?;
                    if let Some(key) = outcome.duplicate.as_ref() {
                        aggregator.report_duplicate(line_number, key)?;
                    }
                },
                Err(e) => {
                    fatal = Some(e);
                    break;
                }
            }
        }

        if let Some(output) = passthrough.as_mut() {
            output.flush()
                .context("Error while flushing pass-through output:")?;
        }

        match fatal {
            Some(e) => {
                aggregator.report_fatal(&e)?;
            },
            None => {
                match self.finish(aggregator.result().record_lines) {
                    Ok(findings) => aggregator.report_all(&findings)?,
                    Err(e) => aggregator.report_fatal(&e)?
                }
            }
        }
        aggregator.finish()
    }

    // getters
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn schema(&self) -> Option<&HeaderSchema> {
        self.schema.as_ref()
    }
}
