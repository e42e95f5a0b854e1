
use serde::Serialize;

/// How serious a finding is before any strictness policy is applied
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, strum_macros::Display, strum_macros::AsRefStr)]
pub enum Severity {
    /// Advisory; does not change the exit status unless strict mode is active
    Warning,
    /// The file is invalid
    Error
}

/// A single problem reported against the input.
/// Findings are immutable once created; the strictness policy decides the effective severity at report time.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Finding {
    /// 1-based line number, None for file-level findings (e.g. no records at all)
    line_number: Option<usize>,
    /// Severity as detected by the rule
    severity: Severity,
    /// Human readable message, without the "line N" prefix or trailing period
    message: String
}

impl Finding {
    /// Constructor for a line-level finding
    /// # Arguments
    /// * `line_number` - the 1-based line the finding refers to
    /// * `severity` - the raw severity from the rule
    /// * `message` - description of the problem
    pub fn new(line_number: usize, severity: Severity, message: String) -> Self {
        Self {
            line_number: Some(line_number),
            severity,
            message
        }
    }

    /// Shortcut for a line-level error
    pub fn error(line_number: usize, message: String) -> Self {
        Self::new(line_number, Severity::Error, message)
    }

    /// Shortcut for a line-level warning
    pub fn warning(line_number: usize, message: String) -> Self {
        Self::new(line_number, Severity::Warning, message)
    }

    /// Constructor for findings that are not tied to a specific line
    pub fn file_level(severity: Severity, message: String) -> Self {
        Self {
            line_number: None,
            severity,
            message
        }
    }

    /// Renders the finding the way the diagnostics stream expects, using `severity` as the label.
    /// # Examples
    /// * `Error: line 2 POS must be >0.`
    /// * `Error: no variant records found.`
    pub fn render(&self, severity: Severity) -> String {
        match self.line_number {
            Some(line_number) => format!("{severity}: line {line_number} {}.", self.message),
            None => format!("{severity}: {}.", self.message)
        }
    }

    // getters
    pub fn line_number(&self) -> Option<usize> {
        self.line_number
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
