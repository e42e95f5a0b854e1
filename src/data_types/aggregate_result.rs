
use serde::Serialize;

/// End-of-stream outcome of a validation run
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct AggregateResult {
    /// Every line read, including blank and header lines
    pub total_lines: u64,
    /// Number of data lines
    pub record_lines: u64,
    /// Findings that ended up as warnings after the strictness policy
    pub warnings: u64,
    /// Findings that ended up as errors after the strictness policy
    pub errors: u64,
    /// Records the duplicate detector flagged as possibly seen before
    pub possible_duplicates: u64,
    /// Set if the scan was stopped by a fatal structural error
    pub fatal_error: Option<String>,
    /// True iff there were no errors and no fatal error
    pub valid: bool
}

impl AggregateResult {
    /// Process exit status matching the result, 0 = valid, 1 = invalid
    pub fn exit_code(&self) -> i32 {
        if self.valid {
            exitcode::OK
        } else {
            1
        }
    }
}
