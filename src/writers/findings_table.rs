
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::data_types::finding::{Finding, Severity};
use crate::data_types::variant_key::VariantKey;

/// Label used for possible duplicates, which are not findings
const DUPLICATE_LABEL: &str = "Duplicate";

/// Streams every reported finding into a delimited table
pub struct FindingsTableWriter<W: Write> {
    /// Handle on the writer
    csv_writer: csv::Writer<W>
}

/// Contains all the data written to each row of the findings table
#[derive(Serialize)]
struct FindingRow<'a> {
    /// 1-based line number; empty for file-level findings
    line_number: Option<usize>,
    /// Severity as detected by the rule
    severity: &'a str,
    /// Severity after the strictness policy
    effective_severity: &'a str,
    /// The finding text
    message: &'a str
}

impl FindingsTableWriter<File> {
    /// Creates a new table writer
    /// # Arguments
    /// * `filename` - path to the output file, comma-delimited if it ends with .csv and tab-delimited otherwise
    pub fn new(filename: &Path) -> csv::Result<Self> {
        // modify the delimiter to "," if it ends with .csv
        let is_csv: bool = filename.extension().unwrap_or_default() == "csv";
        let delimiter: u8 = if is_csv { b',' } else { b'\t' };
        let file = File::create(filename)?;
        Ok(Self::from_writer(file, delimiter))
    }
}

impl<W: Write> FindingsTableWriter<W> {
    /// Wraps an arbitrary writer
    pub fn from_writer(writer: W, delimiter: u8) -> Self {
        let csv_writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        Self {
            csv_writer
        }
    }

    /// Adds one finding
    /// # Arguments
    /// * `finding` - the finding as created by the rules
    /// * `effective` - the severity after the strictness policy
    pub fn write_finding(&mut self, finding: &Finding, effective: Severity) -> csv::Result<()> {
        let severity = finding.severity();
        let row = FindingRow {
            line_number: finding.line_number(),
            severity: severity.as_ref(),
            effective_severity: effective.as_ref(),
            message: finding.message()
        };
        self.csv_writer.serialize(&row)
    }

    /// Adds one possible duplicate
    pub fn write_duplicate(&mut self, line_number: usize, key: &VariantKey) -> csv::Result<()> {
        let message = format!("possibly repeats an earlier variant ({key})");
        let row = FindingRow {
            line_number: Some(line_number),
            severity: DUPLICATE_LABEL,
            effective_severity: DUPLICATE_LABEL,
            message: &message
        };
        self.csv_writer.serialize(&row)
    }

    /// Flushes everything written so far
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.csv_writer.flush()
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> anyhow::Result<W> {
        self.csv_writer.into_inner()
            .map_err(|e| anyhow::anyhow!("Error while flushing findings table: {}", e.error()))
    }
}
