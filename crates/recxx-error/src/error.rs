//! The main Error type for recxx.

use crate::{ErrorKind, ErrorStatus};
use std::fmt;

/// Unified error type for all recxx operations.
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: ErrorStatus,
    operation: &'static str,
    context: Vec<(&'static str, String)>,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    /// Create a new error with the given kind and message.
    ///
    /// The status is derived from the kind's fatality classification.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let status = if kind.is_fatal() {
            ErrorStatus::Fatal
        } else {
            ErrorStatus::Recoverable
        };

        Self {
            kind,
            message: message.into(),
            status,
            operation: "",
            context: Vec::new(),
            source: None,
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the error status
    pub fn status(&self) -> ErrorStatus {
        self.status
    }

    /// Get the operation that caused this error
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Get the context key-value pairs
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Get the source error (if any).
    pub fn source_ref(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_ref().map(|e| e.as_ref())
    }

    /// Set the error status.
    pub fn with_status(mut self, status: ErrorStatus) -> Self {
        self.status = status;
        self
    }

    /// Mark as fatal for the current compilation run
    pub fn fatal(mut self) -> Self {
        self.status = ErrorStatus::Fatal;
        self
    }

    /// Mark as recoverable at the declaration boundary
    pub fn recoverable(mut self) -> Self {
        self.status = ErrorStatus::Recoverable;
        self
    }

    /// Set the operation that caused this error.
    ///
    /// If an operation was already set, the previous one is moved to context
    /// as "called" to preserve the call chain.
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if !self.operation.is_empty() {
            self.context.push(("called", self.operation.to_string()));
        }
        self.operation = operation;
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Set the source error.
    ///
    /// # Panics (debug only)
    /// Panics in debug mode if source was already set.
    pub fn set_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        debug_assert!(self.source.is_none(), "source error already set");
        self.source = Some(Box::new(source));
        self
    }

    /// Check if this error aborts the compilation run
    pub fn is_fatal(&self) -> bool {
        self.status.is_fatal()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) at {}", self.kind, self.status, self.operation)?;

        if !self.context.is_empty() {
            write!(f, ", context {{ ")?;
            for (i, (key, value)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", key, value)?;
            }
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({}) at {}", self.kind, self.status, self.operation)?;

        if !self.message.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Message: {}", self.message)?;
        }

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Context:")?;
            for (key, value) in &self.context {
                writeln!(f, "        {}: {}", key, value)?;
            }
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "    Source: {:?}", source)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl Error {
    /// Create an Unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// Create an UnknownIdentifier error
    pub fn unknown_identifier(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            ErrorKind::UnknownIdentifier,
            format!("identifier '{}' not declared in any enclosing scope", name),
        )
        .with_context("identifier", name)
    }

    /// Create an InvalidQualifier error
    pub fn invalid_qualifier(name: impl Into<String>, message: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(ErrorKind::InvalidQualifier, message).with_context("qualifier", name)
    }

    /// Create an AmbiguousSymbol error
    pub fn ambiguous_symbol(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            ErrorKind::AmbiguousSymbol,
            format!("name '{}' does not denote a single entity", name),
        )
        .with_context("name", name)
    }

    /// Create an UnsupportedConstruct error
    pub fn unsupported_construct(construct: impl Into<String>) -> Self {
        let construct = construct.into();
        Self::new(
            ErrorKind::UnsupportedConstruct,
            format!("'{}' is not supported by this resolver", construct),
        )
        .with_context("construct", construct)
    }

    /// Create a UnificationMismatch error
    pub fn unification_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnificationMismatch, message)
    }

    /// Create a RecursionLimitExceeded error
    pub fn recursion_limit(limit: usize) -> Self {
        Self::new(
            ErrorKind::RecursionLimitExceeded,
            format!("template instantiation exceeded depth {}", limit),
        )
        .with_context("limit", limit.to_string())
    }

    /// Create a NestingTooDeep error
    pub fn nesting_too_deep(limit: usize) -> Self {
        Self::new(
            ErrorKind::NestingTooDeep,
            format!("scope nesting exceeded depth {}", limit),
        )
        .with_context("limit", limit.to_string())
    }
}
