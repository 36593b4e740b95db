//! Error kinds for recxx operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// This enum categorizes failures of the resolution and instantiation core.
/// Callers match on ErrorKind to decide whether to abort the current
/// declaration or substitute an error-type placeholder and keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// Invalid configuration or parameters
    ConfigInvalid,

    /// Invalid argument passed to a function
    InvalidArgument,

    // =========================================================================
    // Lookup errors
    // =========================================================================
    /// The lookup chain was exhausted without finding the name
    UnknownIdentifier,

    /// A qualifier resolved to a non-scope entity, or a namespace
    /// qualifier followed a class qualifier in the same path
    InvalidQualifier,

    /// A name that must denote a single entity resolved to several
    AmbiguousSymbol,

    /// A deliberately unimplemented id-expression variant was encountered
    UnsupportedConstruct,

    // =========================================================================
    // Template errors
    // =========================================================================
    /// Structural shape conflict during unification
    UnificationMismatch,

    /// No candidate template matched the argument list
    NoMatchingTemplate,

    /// Several candidates matched and none is strictly more specialized
    AmbiguousTemplate,

    // =========================================================================
    // Resource-limit errors
    // =========================================================================
    /// The feasible-specialization bound was exceeded
    TooManyFeasibleCandidates,

    /// Template instantiation recursed past the configured depth
    RecursionLimitExceeded,

    /// Scope nesting exceeded the configured maximum
    NestingTooDeep,

    /// Template parameter or argument count exceeded the configured maximum
    TooManyArguments,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// Check if this error kind aborts the whole compilation run.
    ///
    /// Fatal kinds indicate either a frontend capability gap or a
    /// pathological, almost-certainly-erroneous input.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorKind::UnsupportedConstruct
                | ErrorKind::TooManyFeasibleCandidates
                | ErrorKind::RecursionLimitExceeded
                | ErrorKind::NestingTooDeep
                | ErrorKind::TooManyArguments
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::UnknownIdentifier.to_string(), "UnknownIdentifier");
        assert_eq!(ErrorKind::AmbiguousTemplate.to_string(), "AmbiguousTemplate");
    }

    #[test]
    fn test_is_fatal() {
        assert!(ErrorKind::UnsupportedConstruct.is_fatal());
        assert!(ErrorKind::TooManyFeasibleCandidates.is_fatal());
        assert!(ErrorKind::RecursionLimitExceeded.is_fatal());
        assert!(!ErrorKind::UnknownIdentifier.is_fatal());
        assert!(!ErrorKind::NoMatchingTemplate.is_fatal());
        assert!(!ErrorKind::UnificationMismatch.is_fatal());
    }
}
