//! # recxx-error
//!
//! Unified error handling for the recxx frontend.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: know what failed (e.g., UnknownIdentifier, AmbiguousTemplate)
//! - **ErrorStatus**: decide how to handle it (Recoverable vs Fatal)
//! - **Error Context**: assist in locating the cause with rich context
//! - **Error Source**: wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use recxx_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::InvalidQualifier, "'x' does not name a scope")
//!         .with_operation("resolve::qualified_id")
//!         .with_context("qualifier", "x")
//!         .with_context("location", "input.cc:42:7"))
//! }
//! ```
//!
//! ## Principles
//!
//! - Fallible resolver and solver operations return `Result<T, recxx_error::Error>`
//! - Lookup misses are ordinary values (empty candidate sets), never errors
//! - Fatal errors abort the compilation run; recoverable ones let the
//!   declaration-processing driver substitute an error type and continue

mod error;
mod kind;
mod status;

pub use error::Error;
pub use kind::ErrorKind;
pub use status::ErrorStatus;

/// Result type alias using the recxx Error.
pub type Result<T> = std::result::Result<T, Error>;
