//! Issues detected while validating the file configuration

/// How serious a configuration issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The value is ignored and a default is used instead.
    Warning,
    /// The configuration cannot be used.
    Error,
}

/// Machine-readable issue code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A vote policy string that does not parse as `MAX/THRESHOLD`
    /// or breaks `1 <= threshold <= max`.
    InvalidVotePolicy { field: String, value: String },
    EmptyModelName { field: String },
    /// A numeric setting outside its allowed range.
    OutOfRange { field: String, value: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Whether any of the issues makes the configuration unusable.
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|issue| issue.severity == Severity::Error)
    }
}
