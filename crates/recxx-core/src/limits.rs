//! Compile-time limits bounding the resolution and instantiation search.
//!
//! These are hard limits, not runtime-tunable knobs. Exceeding one is a
//! reported resource-limit error, never undefined behavior.

/// AST limits
pub const MAX_AST_CHILDREN: usize = 4;

/// Scope limits
pub const MAX_SCOPE_NESTING: usize = 128;

/// Template limits
pub const MAX_TEMPLATE_PARAMETERS: usize = 256;
pub const MAX_TEMPLATE_ARGUMENTS: usize = 256;
pub const MAX_FEASIBLE_SPECIALIZATIONS: usize = 256;

/// Bound on recursive instantiation (a template argument's resolution
/// itself triggering template solving).
pub const MAX_INSTANTIATION_DEPTH: usize = 128;
