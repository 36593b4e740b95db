//! Error status for the propagation policy

use std::fmt;

/// The status of an error, indicating how far it propagates.
///
/// This encodes the propagation policy of the core:
/// - `Recoverable`: the declaration-processing driver may substitute an
///   error-type placeholder and continue, to maximize diagnostics per run
/// - `Fatal`: the current compilation run must abort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorStatus {
    /// The caller may recover at the declaration boundary.
    ///
    /// Examples: NoMatchingTemplate, AmbiguousTemplate, UnificationMismatch
    #[default]
    Recoverable,

    /// The compilation run must abort.
    ///
    /// Examples: UnsupportedConstruct, RecursionLimitExceeded
    Fatal,
}

impl ErrorStatus {
    /// Check whether the compilation run must abort
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorStatus::Fatal)
    }

    /// Get status as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorStatus::Recoverable => "recoverable",
            ErrorStatus::Fatal => "fatal",
        }
    }
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_fatality() {
        assert!(!ErrorStatus::Recoverable.is_fatal());
        assert!(ErrorStatus::Fatal.is_fatal());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ErrorStatus::Recoverable.to_string(), "recoverable");
        assert_eq!(ErrorStatus::Fatal.to_string(), "fatal");
    }
}
