
use anyhow::Context;
use std::fs::File;
use std::io::Write;

use crate::data_types::aggregate_result::AggregateResult;
use crate::data_types::finding::{Finding, Severity};
use crate::data_types::variant_key::VariantKey;
use crate::rules::strictness::StrictnessPolicy;
use crate::writers::findings_table::FindingsTableWriter;

/// Counts findings, prints them to the diagnostics stream, and produces the final `AggregateResult`.
/// Diagnostics are written in the order they are reported, one line each.
pub struct ReportAggregator<W: Write> {
    /// Where the human readable lines go, usually stderr
    diagnostics: W,
    /// Decides the effective severity of each finding
    policy: StrictnessPolicy,
    /// Optional table that receives a copy of every finding
    findings_table: Option<FindingsTableWriter<File>>,
    /// Running counters
    result: AggregateResult
}

impl<W: Write> ReportAggregator<W> {
    /// Constructor
    /// # Arguments
    /// * `diagnostics` - the diagnostics stream
    /// * `policy` - the strictness policy for this run
    pub fn new(diagnostics: W, policy: StrictnessPolicy) -> Self {
        Self {
            diagnostics,
            policy,
            findings_table: None,
            result: AggregateResult::default()
        }
    }

    /// Adds a findings table that mirrors the diagnostics
    pub fn with_findings_table(mut self, table: FindingsTableWriter<File>) -> Self {
        self.findings_table = Some(table);
        self
    }

    /// Counts one line read from the input
    pub fn count_line(&mut self) {
        self.result.total_lines += 1;
    }

    /// Counts one data line
    pub fn count_record(&mut self) {
        self.result.record_lines += 1;
    }

    /// Reports a single finding under the strictness policy.
    /// # Errors
    /// * if the diagnostics stream or the findings table cannot be written
    pub fn report(&mut self, finding: &Finding) -> anyhow::Result<()> {
        let effective = self.policy.effective_severity(finding.severity());
        match effective {
            Severity::Warning => self.result.warnings += 1,
            Severity::Error => self.result.errors += 1
        };
        writeln!(self.diagnostics, "{}", finding.render(effective))
            .context("Error while writing diagnostics:")?;
        if let Some(table) = self.findings_table.as_mut() {
            table.write_finding(finding, effective)
                .context("Error while writing findings table:")?;
        }
        Ok(())
    }

    /// Reports every finding in order
    pub fn report_all(&mut self, findings: &[Finding]) -> anyhow::Result<()> {
        for finding in findings.iter() {
            self.report(finding)?;
        }
        Ok(())
    }

    /// Reports a possible duplicate. These are counted on their own and never change validity, since the detector can raise false alarms.
    /// # Arguments
    /// * `line_number` - the line of the repeated record
    /// * `key` - the identity that was possibly seen before
    pub fn report_duplicate(&mut self, line_number: usize, key: &VariantKey) -> anyhow::Result<()> {
        self.result.possible_duplicates += 1;
        writeln!(self.diagnostics, "Duplicate: line {line_number} possibly repeats an earlier variant ({key}).")
            .context("Error while writing diagnostics:")?;
        if let Some(table) = self.findings_table.as_mut() {
            table.write_duplicate(line_number, key)
                .context("Error while writing findings table:")?;
        }
        Ok(())
    }

    /// Reports the error that stopped the scan; it counts as an error and always makes the file invalid.
    /// # Arguments
    /// * `error` - anything that describes the fatal problem
    pub fn report_fatal<E: std::fmt::Display>(&mut self, error: &E) -> anyhow::Result<()> {
        let message = error.to_string();
        self.report(&Finding::file_level(Severity::Error, message.clone()))?;
        self.result.fatal_error = Some(message);
        Ok(())
    }

    /// Writes the summary lines and returns the final result.
    /// Validity is decided here: no errors after the strictness policy and no fatal error.
    /// # Errors
    /// * if the diagnostics stream or the findings table cannot be flushed
    pub fn finish(&mut self) -> anyhow::Result<AggregateResult> {
        let result = &mut self.result;
        result.valid = result.errors == 0 && result.fatal_error.is_none();

        if result.possible_duplicates > 0 {
            writeln!(self.diagnostics,
                "Possible duplicates: {} (approximate, may include false positives).", result.possible_duplicates
            ).context("Error while writing diagnostics:")?;
        }
        writeln!(self.diagnostics,
            "Scanned {} lines ({} records): {} errors, {} warnings.",
            result.total_lines, result.record_lines, result.errors, result.warnings
        ).context("Error while writing diagnostics:")?;
        let verdict = if result.valid { "VCF file is valid." } else { "VCF file is invalid." };
        writeln!(self.diagnostics, "{verdict}")
            .context("Error while writing diagnostics:")?;
        self.diagnostics.flush()
            .context("Error while flushing diagnostics:")?;

        if let Some(table) = self.findings_table.as_mut() {
            table.flush()
                .context("Error while flushing findings table:")?;
        }
        Ok(self.result.clone())
    }

    // getters
    pub fn result(&self) -> &AggregateResult {
        &self.result
    }

    pub fn diagnostics(&self) -> &W {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> W {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(aggregator: ReportAggregator<Vec<u8>>) -> String {
        String::from_utf8(aggregator.into_diagnostics()).unwrap()
    }

    #[test]
    fn test_valid_run() {
        let mut aggregator = ReportAggregator::new(vec![], StrictnessPolicy::new(false));
        for _ in 0..3 {
            aggregator.count_line();
        }
        aggregator.count_record();
        aggregator.report(&Finding::warning(3, "INFO field X not defined in header".to_string())).unwrap();
        let result = aggregator.finish().unwrap();
        assert!(result.valid);
        assert_eq!(result.exit_code(), 0);
        assert_eq!(result.warnings, 1);
        assert_eq!(result.errors, 0);
        assert_eq!(text(aggregator),
            "Warning: line 3 INFO field X not defined in header.\n\
            Scanned 3 lines (1 records): 0 errors, 1 warnings.\n\
            VCF file is valid.\n"
        );
    }

    #[test]
    fn test_strict_promotes_warnings() {
        let mut aggregator = ReportAggregator::new(vec![], StrictnessPolicy::new(true));
        aggregator.report(&Finding::warning(3, "INFO field X not defined in header".to_string())).unwrap();
        let result = aggregator.finish().unwrap();
        assert!(!result.valid);
        assert_eq!(result.exit_code(), 1);
        assert_eq!((result.errors, result.warnings), (1, 0));
        assert!(text(aggregator).starts_with("Error: line 3 INFO field X not defined in header.\n"));
    }

    #[test]
    fn test_duplicates_do_not_change_validity() {
        let mut aggregator = ReportAggregator::new(vec![], StrictnessPolicy::new(true));
        aggregator.report_duplicate(4, &VariantKey::new("chr1", 10, "A", &["C"])).unwrap();
        let result = aggregator.finish().unwrap();
        assert!(result.valid);
        assert_eq!(result.possible_duplicates, 1);
        let output = text(aggregator);
        assert!(output.starts_with("Duplicate: line 4 possibly repeats an earlier variant (chr1:10:A:C).\n"));
        assert!(output.ends_with("VCF file is valid.\n"));
    }

    #[test]
    fn test_fatal() {
        let mut aggregator = ReportAggregator::new(vec![], StrictnessPolicy::new(false));
        aggregator.report_fatal(&"no #CHROM line found in file").unwrap();
        let result = aggregator.finish().unwrap();
        assert!(!result.valid);
        assert_eq!(result.fatal_error.as_deref(), Some("no #CHROM line found in file"));
        assert_eq!(text(aggregator),
            "Error: no #CHROM line found in file.\n\
            Scanned 0 lines (0 records): 1 errors, 0 warnings.\n\
            VCF file is invalid.\n"
        );
    }

    #[test]
    fn test_findings_table() {
        let dir = tempfile::tempdir().unwrap();
        let table_fn = dir.path().join("findings.tsv");
        let table = FindingsTableWriter::new(&table_fn).unwrap();
        let mut aggregator = ReportAggregator::new(vec![], StrictnessPolicy::new(false))
            .with_findings_table(table);
        aggregator.report(&Finding::error(2, "POS must be >0".to_string())).unwrap();
        aggregator.finish().unwrap();

        let table_text = std::fs::read_to_string(&table_fn).unwrap();
        assert_eq!(table_text.lines().nth(1), Some("2\tError\tError\tPOS must be >0"));
    }
}
