//! Name resolution and template instantiation.
//!
//! Three collaborating pieces:
//! - [`NameResolver`] answers id-expression lookups against the scope chain,
//! - [`Unifier`] matches template patterns against concrete arguments,
//! - [`TemplateSolver`] picks the best candidate among specializations.

pub mod resolve;
pub mod solve;
pub mod unify;

pub use resolve::{NameResolver, filter_simple_type_specifier};
pub use solve::{MatchedPair, SolveError, TemplateSolver};
pub use unify::{Binding, Substitution, Unifier};
