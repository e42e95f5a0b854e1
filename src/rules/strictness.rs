
use crate::data_types::finding::{Finding, Severity};

/// Decides effective severities and the two comparisons that tighten in strict mode
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StrictnessPolicy {
    /// if true, warnings count as errors and column/sub-field counts must match exactly
    strict: bool
}

impl StrictnessPolicy {
    /// Constructor
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    /// The severity a finding counts as under this policy
    pub fn effective_severity(&self, severity: Severity) -> Severity {
        if self.strict {
            Severity::Error
        } else {
            severity
        }
    }

    /// Compares a data line's column count against the #CHROM line.
    /// Strict mode requires an exact match (Error); otherwise a difference is a Warning.
    /// # Arguments
    /// * `line_number` - line being checked
    /// * `found` - columns on the data line
    /// * `expected` - columns on the #CHROM line
    pub fn check_column_count(&self, line_number: usize, found: usize, expected: usize) -> Option<Finding> {
        if found == expected {
            return None;
        }
        let message = format!("has {found} columns but header specifies {expected}");
        if self.strict {
            Some(Finding::error(line_number, message))
        } else {
            Some(Finding::warning(line_number, message))
        }
    }

    /// Compares a sample's sub-field count against the FORMAT key count.
    /// Strict mode requires an exact match (Error); otherwise only extra sub-fields are flagged (Warning).
    /// # Arguments
    /// * `line_number` - line being checked
    /// * `sample_index` - 1-based sample column index
    /// * `found` - number of `:`-separated sub-fields in the sample
    /// * `expected` - number of FORMAT keys
    pub fn check_sample_fields(&self, line_number: usize, sample_index: usize, found: usize, expected: usize) -> Option<Finding> {
        let message = format!("sample column {sample_index} has {found} sub-fields but FORMAT has {expected} keys");
        if self.strict {
            (found != expected).then(|| Finding::error(line_number, message))
        } else {
            (found > expected).then(|| Finding::warning(line_number, message))
        }
    }

    // getters
    pub fn is_strict(&self) -> bool {
        self.strict
    }
}
